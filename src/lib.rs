#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # socialfx
//!
//! Mask-based photo effects for social media images: a colored outline
//! stroke around a segmented subject (optionally over a replacement
//! background) and a privacy blur over the face region.
//!
//! The heavy lifting is pure mask geometry and hard-edge compositing:
//!
//! - **Mask scaling**: center-pivoted rotate/scale (Lanczos) or crop/resize
//! - **Outline band**: XOR of a subject mask and its scaled copy
//! - **Region masks**: class-map membership in a fixed allow-list
//! - **Compositing**: exact per-pixel selection, with a defined layer order
//!   when the background is replaced
//!
//! Model inference is injected through the [`SegmentationProvider`] and
//! [`FaceParsingProvider`] traits. ONNX Runtime implementations are
//! available with the `onnx` feature.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use socialfx::{apply_stroke, backends::OnnxSegmenter, Color, ExecutionProvider};
//! use socialfx::services::ImageIOService;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut segmenter = OnnxSegmenter::from_file("u2net_human_seg.onnx", ExecutionProvider::Auto)?;
//! let image = ImageIOService::load_image("portrait.jpg")?;
//! let stroked = apply_stroke(&image, &mut segmenter, Color::YELLOW, 1.03)?;
//! ImageIOService::save_image(&stroked, "portrait_stroke.jpg", 90)?;
//! # Ok(())
//! # }
//! ```
//!
//! For full control (rotation, crop/resize scaling, debug dumps, timings)
//! build an [`EffectConfig`] and use [`EffectProcessor`] directly.
//!
//! ### Feature Flags
//!
//! - `onnx` (default): ONNX Runtime segmentation and face-parsing providers
//! - `cli` (default): the `socialfx` command-line tool
//! - `tracing-json`: JSON log output for the CLI
//! - `webp-support`: WebP decoding and encoding

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod content;
pub mod error;
pub mod inference;
pub mod mask;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

pub use compositor::{prepare_background, AlphaCompositor, LayerInputs, LayeredCompositor};
pub use config::{
    BlurConfig, DebugConfig, EffectConfig, EffectConfigBuilder, ExecutionProvider, ScaleAlgorithm,
    ScaleSpec, StrokeConfig, FACE_CLASS_IDS,
};
pub use content::{box_blur, flat_fill};
pub use error::{EffectError, ErrorKind, Result};
pub use inference::{FaceParsingProvider, SegmentationProvider};
pub use mask::{post_process_mask, MaskScaler, OutlineBandExtractor, OutlineMasks, RegionMaskBuilder};
pub use processor::EffectProcessor;
pub use services::{
    BatchJob, BatchReport, BatchRunner, DebugSink, ImageIOService, ProcessingStage,
    ProgressReporter,
};
pub use types::{ClassMap, Color, EffectKind, EffectResult, Mask, ProcessingTimings};
pub use utils::{ColorParser, ParameterValidator};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

use image::RgbImage;

/// Paint a `color` outline around the subject found by `provider`
///
/// The outline is the band between the subject mask and its copy scaled by
/// `zoom_factor` about the image center. Values in `(1.00, 1.10]` give a
/// thin outline.
///
/// # Errors
/// - `InvalidParameter` for a non-positive or non-finite `zoom_factor`
/// - `InvalidInput` for an empty image
/// - `ProviderFailure` when segmentation fails
pub fn apply_stroke<P>(
    image: &RgbImage,
    provider: &mut P,
    color: Color,
    zoom_factor: f32,
) -> Result<RgbImage>
where
    P: SegmentationProvider + ?Sized,
{
    let config = EffectConfig::builder()
        .stroke_color(color)
        .zoom_factor(zoom_factor)
        .build()?;
    EffectProcessor::new(config)?
        .stroke(image, provider)
        .map(EffectResult::into_image)
}

/// Paint a `color` outline around the subject and replace the rest of the
/// picture with `background`
///
/// `background` is resized to the image's dimensions.
///
/// # Errors
/// - `InvalidParameter` for a non-positive or non-finite `zoom_factor`
/// - `InvalidInput` for an empty image or background
/// - `ProviderFailure` when segmentation fails
pub fn apply_stroke_with_background<P>(
    image: &RgbImage,
    background: &RgbImage,
    provider: &mut P,
    color: Color,
    zoom_factor: f32,
) -> Result<RgbImage>
where
    P: SegmentationProvider + ?Sized,
{
    let config = EffectConfig::builder()
        .stroke_color(color)
        .zoom_factor(zoom_factor)
        .build()?;
    EffectProcessor::new(config)?
        .stroke_with_background(image, background, provider)
        .map(EffectResult::into_image)
}

/// Box-blur the face region found by `provider`
///
/// # Errors
/// - `InvalidParameter` when `blur_kernel_size` is zero or even
/// - `InvalidInput` for an empty image
/// - `ProviderFailure` when face parsing fails
pub fn apply_face_blur<P>(image: &RgbImage, provider: &mut P, blur_kernel_size: u32) -> Result<RgbImage>
where
    P: FaceParsingProvider + ?Sized,
{
    let config = EffectConfig::builder().blur_kernel(blur_kernel_size).build()?;
    EffectProcessor::new(config)?
        .face_blur(image, provider)
        .map(EffectResult::into_image)
}
