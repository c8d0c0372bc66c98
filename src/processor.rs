//! Effect processor
//!
//! `EffectProcessor` runs the stages of each effect in order, records
//! per-stage timings, writes debug dumps and tags every failure with the
//! stage that raised it. It owns no model: providers are passed per call.

use crate::{
    compositor::{prepare_background, AlphaCompositor, LayerInputs, LayeredCompositor},
    config::EffectConfig,
    content,
    error::{EffectError, Result},
    inference::{ensure_output_dimensions, FaceParsingProvider, SegmentationProvider},
    mask::{OutlineBandExtractor, OutlineMasks, RegionMaskBuilder},
    services::{DebugSink, ProcessingStage},
    types::{EffectKind, EffectResult, Mask, ProcessingTimings},
};
use image::{imageops::FilterType, RgbImage};
use instant::Instant;
use tracing::{debug, info, instrument, span, Level};

/// Runs stroke and face-blur effects with a fixed configuration
#[derive(Debug, Clone)]
pub struct EffectProcessor {
    config: EffectConfig,
    debug: DebugSink,
}

impl EffectProcessor {
    /// Create a processor; enables debug dumps when the config asks for them
    ///
    /// # Errors
    /// - `InvalidParameter` for an invalid configuration
    pub fn new(config: EffectConfig) -> Result<Self> {
        config.validate()?;
        let debug = DebugSink::from_config(&config.debug);
        Ok(Self { config, debug })
    }

    #[must_use]
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    #[must_use]
    pub fn debug_sink(&self) -> &DebugSink {
        &self.debug
    }

    /// Paint an outline stroke around the segmented subject
    ///
    /// # Errors
    /// - `InvalidInput` for an empty image
    /// - `ProviderFailure` when segmentation fails or returns a mask of the wrong size
    /// - `InvalidParameter` when the scale spec cannot be applied
    #[instrument(
        skip(self, image, provider),
        fields(
            effect = "stroke",
            provider = provider.name(),
            dimensions = %format!("{}x{}", image.width(), image.height())
        )
    )]
    pub fn stroke<P>(&self, image: &RgbImage, provider: &mut P) -> Result<EffectResult>
    where
        P: SegmentationProvider + ?Sized,
    {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::default();

        let outline = self.outline(image, provider, &mut timings)?;
        let fill = self.stroke_fill(image, &mut timings);

        let output = {
            let _span = span!(Level::DEBUG, "compositing").entered();
            let start = Instant::now();
            let output = AlphaCompositor::with_debug(&self.debug, "d004")
                .composite(image, &fill, &outline.band)
                .map_err(|e| e.at_stage(ProcessingStage::Compositing))?;
            timings.compositing_ms = start.elapsed().as_millis() as u64;
            output
        };

        self.debug.write_rgb("d001_overlay_image.png", &fill);
        self.debug.write_mask("d002_unet2_mask_image.png", &outline.subject);
        self.debug.write_mask("d003_unet2_mask_scaled_image.png", &outline.scaled);
        self.debug.write_mask("d004_overlay_mask_image.png", &outline.band);
        self.debug.write_rgb("d005_overlay_image.png", &output);

        Ok(self.finish(output, outline.band, EffectKind::Stroke, timings, total_start))
    }

    /// Paint an outline stroke and replace everything outside the scaled
    /// silhouette with `background`
    ///
    /// The background is resized to the image's dimensions first.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty image or background
    /// - `ProviderFailure` when segmentation fails or returns a mask of the wrong size
    /// - `InvalidParameter` when the scale spec cannot be applied
    #[instrument(
        skip(self, image, background, provider),
        fields(
            effect = "stroke_with_background",
            provider = provider.name(),
            dimensions = %format!("{}x{}", image.width(), image.height())
        )
    )]
    pub fn stroke_with_background<P>(
        &self,
        image: &RgbImage,
        background: &RgbImage,
        provider: &mut P,
    ) -> Result<EffectResult>
    where
        P: SegmentationProvider + ?Sized,
    {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::default();

        let outline = self.outline(image, provider, &mut timings)?;
        let fill = self.stroke_fill(image, &mut timings);

        let background = {
            let _span = span!(Level::DEBUG, "background_preparation").entered();
            let start = Instant::now();
            let resized = prepare_background(background, image.dimensions())
                .map_err(|e| e.at_stage(ProcessingStage::BackgroundPreparation))?;
            timings.content_ms += start.elapsed().as_millis() as u64;
            resized
        };

        let output = {
            let _span = span!(Level::DEBUG, "compositing").entered();
            let start = Instant::now();
            let output = LayeredCompositor::with_debug(&self.debug)
                .composite(&LayerInputs {
                    base: image,
                    background: &background,
                    stroke: &fill,
                    subject_mask: &outline.subject,
                    scaled_mask: &outline.scaled,
                    band_mask: &outline.band,
                })
                .map_err(|e| e.at_stage(ProcessingStage::Compositing))?;
            timings.compositing_ms = start.elapsed().as_millis() as u64;
            output
        };

        self.debug.write_rgb("d001_overlay_image.png", &fill);
        self.debug.write_mask("d002_unet2_mask_image.png", &outline.subject);
        self.debug.write_mask("d003_unet2_mask_scaled_image.png", &outline.scaled);
        self.debug.write_mask("d004_stroke_mask_image.png", &outline.band);
        self.debug.write_rgb("d005_overlay_image.png", &output);

        Ok(self.finish(
            output,
            outline.band,
            EffectKind::StrokeWithBackground,
            timings,
            total_start,
        ))
    }

    /// Blur the face region found by the face parser
    ///
    /// The image is resized to the parser's square input size for parsing
    /// only. The class map is brought back to full resolution with
    /// nearest-neighbour sampling and everything else runs at the original
    /// resolution, so pixels outside the face region are untouched.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty image
    /// - `ProviderFailure` when parsing fails or returns a map of the wrong size
    #[instrument(
        skip(self, image, provider),
        fields(
            effect = "face_blur",
            provider = provider.name(),
            kernel = self.config.blur.kernel_size,
            dimensions = %format!("{}x{}", image.width(), image.height())
        )
    )]
    pub fn face_blur<P>(&self, image: &RgbImage, provider: &mut P) -> Result<EffectResult>
    where
        P: FaceParsingProvider + ?Sized,
    {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::default();
        ensure_not_empty(image)?;
        let (width, height) = image.dimensions();

        let class_map = {
            let _span = span!(Level::INFO, "face_parsing", provider = provider.name()).entered();
            let start = Instant::now();
            let size = provider.input_size();
            if size == 0 {
                return Err(EffectError::provider(format!(
                    "{} reports a zero input size",
                    provider.name()
                ))
                .at_stage(ProcessingStage::FaceParsing));
            }
            let resized = if (width, height) == (size, size) {
                image.clone()
            } else {
                image::imageops::resize(image, size, size, FilterType::Triangle)
            };
            self.debug.write_rgb("d001_input_image.png", image);
            self.debug.write_rgb("d002_input_resized.png", &resized);

            let parsed = provider
                .infer(&resized)
                .and_then(|map| {
                    ensure_output_dimensions(provider.name(), (size, size), map.dimensions())?;
                    Ok(map)
                })
                .map_err(|e| e.at_stage(ProcessingStage::FaceParsing))?;
            timings.inference_ms = start.elapsed().as_millis() as u64;
            parsed.resize_nearest(width, height)
        };

        let face_mask = {
            let _span = span!(Level::DEBUG, "region_mask").entered();
            let start = Instant::now();
            let builder = RegionMaskBuilder::new(&self.config.blur.class_ids)
                .map_err(|e| e.at_stage(ProcessingStage::RegionMask))?;
            let mask = builder.build(&class_map);
            timings.mask_ms = start.elapsed().as_millis() as u64;
            debug!(face_pixels = mask.count(), "Built face region mask");
            mask
        };
        self.debug.write_mask("d003_face_mask.png", &face_mask);

        let blurred = {
            let _span = span!(Level::DEBUG, "content_generation", kernel = self.config.blur.kernel_size)
                .entered();
            let start = Instant::now();
            let blurred = content::box_blur(image, self.config.blur.kernel_size)
                .map_err(|e| e.at_stage(ProcessingStage::ContentGeneration))?;
            timings.content_ms = start.elapsed().as_millis() as u64;
            blurred
        };
        self.debug.write_rgb("d004_input_blurred.png", &blurred);

        let output = {
            let _span = span!(Level::DEBUG, "compositing").entered();
            let start = Instant::now();
            let output = AlphaCompositor::with_debug(&self.debug, "d005")
                .composite(image, &blurred, &face_mask)
                .map_err(|e| e.at_stage(ProcessingStage::Compositing))?;
            timings.compositing_ms = start.elapsed().as_millis() as u64;
            output
        };
        self.debug.write_rgb("d006_final.png", &output);

        Ok(self.finish(output, face_mask, EffectKind::FaceBlur, timings, total_start))
    }

    /// Segment, scale and extract the outline band
    fn outline<P>(
        &self,
        image: &RgbImage,
        provider: &mut P,
        timings: &mut ProcessingTimings,
    ) -> Result<OutlineMasks>
    where
        P: SegmentationProvider + ?Sized,
    {
        ensure_not_empty(image)?;

        let subject = {
            let _span = span!(Level::INFO, "segmentation", provider = provider.name()).entered();
            let start = Instant::now();
            let mask = segment(image, provider).map_err(|e| e.at_stage(ProcessingStage::Segmentation))?;
            timings.inference_ms = start.elapsed().as_millis() as u64;
            debug!(subject_pixels = mask.count(), "Segmented subject");
            mask
        };

        let _span = span!(
            Level::DEBUG,
            "mask_scaling",
            factor = self.config.stroke.scale.factor,
            algorithm = %self.config.stroke.scale.algorithm
        )
        .entered();
        let start = Instant::now();
        let scaled = crate::mask::MaskScaler::scale(&subject, &self.config.stroke.scale)
            .map_err(|e| e.at_stage(ProcessingStage::MaskScaling))?;
        let band = OutlineBandExtractor::extract(&subject, &scaled)
            .map_err(|e| e.at_stage(ProcessingStage::BandExtraction))?;
        timings.mask_ms = start.elapsed().as_millis() as u64;

        if band.is_empty() {
            debug!("Outline band is empty; the output will match the input");
        }
        Ok(OutlineMasks {
            subject,
            scaled,
            band,
        })
    }

    fn stroke_fill(&self, image: &RgbImage, timings: &mut ProcessingTimings) -> RgbImage {
        let _span = span!(Level::DEBUG, "content_generation", color = %self.config.stroke.color).entered();
        let start = Instant::now();
        let fill = content::flat_fill(image.width(), image.height(), self.config.stroke.color);
        timings.content_ms = start.elapsed().as_millis() as u64;
        fill
    }

    fn finish(
        &self,
        image: RgbImage,
        effect_mask: Mask,
        effect: EffectKind,
        mut timings: ProcessingTimings,
        total_start: Instant,
    ) -> EffectResult {
        timings.total_ms = total_start.elapsed().as_millis() as u64;
        info!(%effect, "{}", timings.summary());
        if self.debug.is_enabled() {
            debug!(
                directory = %self.debug.directory().map(|d| d.display().to_string()).unwrap_or_default(),
                "Debug images written"
            );
        }
        EffectResult {
            image,
            effect_mask,
            effect,
            timings,
        }
    }
}

fn ensure_not_empty(image: &RgbImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EffectError::invalid_input(format!(
            "Cannot process a {}x{} image",
            image.width(),
            image.height()
        ))
        .at_stage(ProcessingStage::ImageLoading));
    }
    Ok(())
}

fn segment<P>(image: &RgbImage, provider: &mut P) -> Result<Mask>
where
    P: SegmentationProvider + ?Sized,
{
    let mask = provider.infer(image)?;
    ensure_output_dimensions(provider.name(), image.dimensions(), mask.dimensions())?;
    Ok(mask)
}
