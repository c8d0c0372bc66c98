//! Shared tensor conversion utilities for model providers
//!
//! Model providers resize the input to a fixed square, normalize it into an
//! NCHW tensor and convert raw outputs back into masks or class maps. The
//! conversions live here so that they can be tested without a model runtime.

use crate::error::{EffectError, Result};
use crate::types::ClassMap;
use image::{imageops::FilterType, GrayImage, Luma, RgbImage};
use ndarray::{Array4, ArrayView2, ArrayView3, Axis};

/// ImageNet channel means (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// How raw `0..=255` pixel values are brought into `0..=1` before normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelScaling {
    /// Divide by 255
    Unit,
    /// Divide by the largest channel value found in the image
    MaxPixel,
}

/// Normalization applied while building an input tensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub scaling: PixelScaling,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalization {
    /// ImageNet statistics after dividing by 255 (face parser)
    #[must_use]
    pub fn imagenet() -> Self {
        Self {
            scaling: PixelScaling::Unit,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }

    /// ImageNet statistics after dividing by the brightest value (u2net family)
    #[must_use]
    pub fn imagenet_max_scaled() -> Self {
        Self {
            scaling: PixelScaling::MaxPixel,
            ..Self::imagenet()
        }
    }
}

/// Shared preprocessing utilities
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Resize `image` to `size`x`size` and convert it to a normalized NCHW tensor
    ///
    /// # Errors
    /// - Zero-sized input image or zero target size
    pub fn image_to_tensor(
        image: &RgbImage,
        size: u32,
        filter: FilterType,
        normalization: &Normalization,
    ) -> Result<Array4<f32>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EffectError::invalid_input(format!(
                "Cannot build a tensor from a {width}x{height} image"
            )));
        }
        if size == 0 {
            return Err(EffectError::invalid_parameter("Tensor size must be positive"));
        }

        let resized = if (width, height) == (size, size) {
            image.clone()
        } else {
            image::imageops::resize(image, size, size, filter)
        };

        let divisor = match normalization.scaling {
            PixelScaling::Unit => 255.0,
            PixelScaling::MaxPixel => {
                let max = resized
                    .pixels()
                    .flat_map(|p| p.0)
                    .max()
                    .unwrap_or(0);
                f32::from(max).max(1e-6)
            }
        };

        let side = size as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                let value = f32::from(pixel[c]) / divisor;
                if let Some(cell) = tensor.get_mut((0, c, y as usize, x as usize)) {
                    *cell = (value - normalization.mean[c]) / normalization.std[c];
                }
            }
        }
        Ok(tensor)
    }

    /// Min-max normalize a single-channel prediction into a `0..=255` grayscale image
    ///
    /// A constant plane maps to all zeros.
    #[must_use]
    pub fn prediction_to_gray(plane: ArrayView2<'_, f32>) -> GrayImage {
        let (rows, cols) = plane.dim();
        let (min, max) = plane.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        let range = max - min;

        GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
            let v = plane.get((y as usize, x as usize)).copied().unwrap_or(min);
            let scaled = if range > f32::EPSILON {
                (v - min) / range * 255.0
            } else {
                0.0
            };
            Luma([scaled.round().clamp(0.0, 255.0) as u8])
        })
    }

    /// Collapse per-class scores of shape `(classes, height, width)` to a class map
    ///
    /// # Errors
    /// - No classes, or more classes than fit in a `u8` id
    pub fn argmax_class_map(scores: ArrayView3<'_, f32>) -> Result<ClassMap> {
        let (classes, rows, cols) = scores.dim();
        if classes == 0 || classes > usize::from(u8::MAX) + 1 {
            return Err(EffectError::provider(format!(
                "Face parser returned {classes} classes"
            )));
        }

        let mut best = ndarray::Array2::<u8>::zeros((rows, cols));
        let mut best_score = scores.index_axis(Axis(0), 0).to_owned();
        for class in 1..classes {
            let plane = scores.index_axis(Axis(0), class);
            ndarray::Zip::from(&mut best)
                .and(&mut best_score)
                .and(&plane)
                .for_each(|id, top, &score| {
                    if score > *top {
                        *top = score;
                        *id = class as u8;
                    }
                });
        }
        Ok(ClassMap::from_array(best))
    }
}
