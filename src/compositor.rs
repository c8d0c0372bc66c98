//! Hard-edge mask compositing
//!
//! Masks select pixels, they never blend them: every output pixel is an
//! exact copy of one of the input layers.

use crate::error::{EffectError, Result};
use crate::services::DebugSink;
use crate::types::Mask;
use image::{imageops::FilterType, Rgb, RgbImage};

const EMPTY: Rgb<u8> = Rgb([0, 0, 0]);

/// Two-source compositor: foreground where the mask is set, base elsewhere
#[derive(Debug, Default, Clone, Copy)]
pub struct AlphaCompositor<'a> {
    debug: Option<(&'a DebugSink, &'static str)>,
}

impl<'a> AlphaCompositor<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { debug: None }
    }

    /// Dump intermediate layers to `sink`, names prefixed with `prefix`
    #[must_use]
    pub fn with_debug(sink: &'a DebugSink, prefix: &'static str) -> Self {
        Self {
            debug: Some((sink, prefix)),
        }
    }

    /// `result[p] = foreground[p]` where `mask[p]` is set, `base[p]` otherwise
    ///
    /// # Errors
    /// - `InvalidInput` when the foreground or mask dimensions differ from the base
    pub fn composite(&self, base: &RgbImage, foreground: &RgbImage, mask: &Mask) -> Result<RgbImage> {
        let dims = base.dimensions();
        ensure_image_dimensions(foreground, dims, "foreground content")?;
        mask.ensure_dimensions(dims, "effect mask")?;

        let output = RgbImage::from_fn(dims.0, dims.1, |x, y| {
            if mask.get(x, y) {
                *foreground.get_pixel(x, y)
            } else {
                *base.get_pixel(x, y)
            }
        });

        if let Some((sink, prefix)) = self.debug.filter(|(sink, _)| sink.is_enabled()) {
            let inverse = mask.inverted();
            sink.write_mask(&format!("{prefix}_01_foreground_image_mask.png"), mask);
            sink.write_rgb(
                &format!("{prefix}_02_foreground_image.png"),
                &masked_layer(foreground, mask),
            );
            sink.write_mask(&format!("{prefix}_03_background_image_mask.png"), &inverse);
            sink.write_rgb(
                &format!("{prefix}_04_background_image.png"),
                &masked_layer(base, &inverse),
            );
        }

        Ok(output)
    }
}

/// Inputs of the background-replacement composite
#[derive(Debug, Clone, Copy)]
pub struct LayerInputs<'a> {
    /// Subject photo
    pub base: &'a RgbImage,
    /// Replacement background, already at the base's dimensions
    pub background: &'a RgbImage,
    /// Stroke content (usually a flat fill)
    pub stroke: &'a RgbImage,
    /// Un-scaled subject silhouette
    pub subject_mask: &'a Mask,
    /// Scaled silhouette
    pub scaled_mask: &'a Mask,
    /// Outline band
    pub band_mask: &'a Mask,
}

impl LayerInputs<'_> {
    fn validate(&self) -> Result<()> {
        let dims = self.base.dimensions();
        ensure_image_dimensions(self.background, dims, "background")?;
        ensure_image_dimensions(self.stroke, dims, "stroke content")?;
        self.subject_mask.ensure_dimensions(dims, "subject mask")?;
        self.scaled_mask.ensure_dimensions(dims, "scaled mask")?;
        self.band_mask.ensure_dimensions(dims, "band mask")?;
        Ok(())
    }
}

/// Three-layer compositor used when the background is replaced
///
/// Layers are painted in order, later layers overwriting earlier ones where
/// their own mask is set:
///
/// 1. background outside the scaled mask
/// 2. subject inside the subject mask
/// 3. stroke inside the band mask
#[derive(Debug, Default, Clone, Copy)]
pub struct LayeredCompositor<'a> {
    debug: Option<&'a DebugSink>,
}

impl<'a> LayeredCompositor<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { debug: None }
    }

    #[must_use]
    pub fn with_debug(sink: &'a DebugSink) -> Self {
        Self { debug: Some(sink) }
    }

    /// Composite the layers
    ///
    /// Pixels covered by none of the three layers (inside the scaled mask but
    /// outside both the subject and the band) stay black.
    ///
    /// # Errors
    /// - `InvalidInput` when any input's dimensions differ from the base
    pub fn composite(&self, inputs: &LayerInputs<'_>) -> Result<RgbImage> {
        inputs.validate()?;
        let (width, height) = inputs.base.dimensions();

        let mut output = RgbImage::from_pixel(width, height, EMPTY);
        for (x, y, pixel) in output.enumerate_pixels_mut() {
            if inputs.band_mask.get(x, y) {
                *pixel = *inputs.stroke.get_pixel(x, y);
            } else if inputs.subject_mask.get(x, y) {
                *pixel = *inputs.base.get_pixel(x, y);
            } else if !inputs.scaled_mask.get(x, y) {
                *pixel = *inputs.background.get_pixel(x, y);
            }
        }

        if let Some(sink) = self.debug.filter(|sink| sink.is_enabled()) {
            let stroke_layer = masked_layer(inputs.stroke, inputs.band_mask);
            let human_layer = masked_layer(inputs.base, inputs.subject_mask);
            let stroke_human = overlay(&human_layer, &stroke_layer, inputs.band_mask);
            let background_mask = inputs.scaled_mask.inverted();
            sink.write_rgb("d004_01_foreground_stroke_image.png", &stroke_layer);
            sink.write_rgb("d004_02_foreground_human_image.png", &human_layer);
            sink.write_rgb("d004_03_background_stroke_human_image.png", &stroke_human);
            sink.write_rgb("d004_04_background_image.png", inputs.background);
            sink.write_mask("d004_04_background_image_mask.png", &background_mask);
            sink.write_rgb(
                "d004_04_background_filtered_image.png",
                &masked_layer(inputs.background, &background_mask),
            );
        }

        Ok(output)
    }
}

/// Resize a replacement background to `(width, height)` with bilinear filtering
///
/// # Errors
/// - `InvalidInput` when the background or target has a zero dimension
pub fn prepare_background(background: &RgbImage, dimensions: (u32, u32)) -> Result<RgbImage> {
    let (width, height) = dimensions;
    if background.width() == 0 || background.height() == 0 || width == 0 || height == 0 {
        return Err(EffectError::invalid_input(format!(
            "Cannot fit a {}x{} background to {width}x{height}",
            background.width(),
            background.height()
        )));
    }
    if background.dimensions() == dimensions {
        return Ok(background.clone());
    }
    Ok(image::imageops::resize(background, width, height, FilterType::Triangle))
}

fn ensure_image_dimensions(image: &RgbImage, expected: (u32, u32), what: &str) -> Result<()> {
    if image.dimensions() == expected {
        Ok(())
    } else {
        Err(EffectError::dimension_mismatch(what, expected, image.dimensions()))
    }
}

/// `image` where `mask` is set, black elsewhere
fn masked_layer(image: &RgbImage, mask: &Mask) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if mask.get(x, y) {
            *image.get_pixel(x, y)
        } else {
            EMPTY
        }
    })
}

fn overlay(under: &RgbImage, over: &RgbImage, mask: &Mask) -> RgbImage {
    RgbImage::from_fn(under.width(), under.height(), |x, y| {
        if mask.get(x, y) {
            *over.get_pixel(x, y)
        } else {
            *under.get_pixel(x, y)
        }
    })
}
