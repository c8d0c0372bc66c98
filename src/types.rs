//! Core types for effect compositing operations

use crate::error::{EffectError, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Binary region-of-interest mask
///
/// Stored as a boolean grid of shape `(height, width)`. The `0/255` encoding
/// only exists at the image boundary (`from_gray` / `to_gray`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Array2<bool>,
}

impl Mask {
    /// Create an empty (all-unset) mask
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: Array2::from_elem((height as usize, width as usize), false),
        }
    }

    /// Wrap a boolean array of shape `(height, width)`
    #[must_use]
    pub fn from_array(data: Array2<bool>) -> Self {
        Self { data }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let data = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            f(x as u32, y as u32)
        });
        Self { data }
    }

    /// Convert a grayscale image, treating values >= 128 as set
    #[must_use]
    pub fn from_gray(image: &GrayImage) -> Self {
        Self::from_gray_threshold(image, 127)
    }

    /// Convert a grayscale image, treating values strictly above `threshold` as set
    #[must_use]
    pub fn from_gray_threshold(image: &GrayImage, threshold: u8) -> Self {
        let (width, height) = image.dimensions();
        Self::from_fn(width, height, |x, y| image.get_pixel(x, y)[0] > threshold)
    }

    /// Render as a `0/255` grayscale image
    #[must_use]
    pub fn to_gray(&self) -> GrayImage {
        let (width, height) = self.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// Mask width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.data.ncols() as u32
    }

    /// Mask height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.data.nrows() as u32
    }

    /// Mask dimensions as `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Whether the pixel at `(x, y)` is set; out-of-bounds pixels are unset
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Set or clear the pixel at `(x, y)`; out-of-bounds writes are ignored
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if let Some(cell) = self.data.get_mut((y as usize, x as usize)) {
            *cell = value;
        }
    }

    /// Number of set pixels
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// True when no pixel is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Borrow the underlying boolean array
    #[must_use]
    pub fn as_array(&self) -> &Array2<bool> {
        &self.data
    }

    /// Consume the mask and return the underlying array
    #[must_use]
    pub fn into_array(self) -> Array2<bool> {
        self.data
    }

    /// Complement of this mask
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            data: self.data.mapv(|v| !v),
        }
    }

    /// Pixel-wise union
    ///
    /// # Errors
    /// - Masks with different dimensions
    pub fn union(&self, other: &Mask) -> Result<Mask> {
        self.zip_with(other, "union operand", |a, b| a || b)
    }

    /// Pixel-wise intersection
    ///
    /// # Errors
    /// - Masks with different dimensions
    pub fn intersection(&self, other: &Mask) -> Result<Mask> {
        self.zip_with(other, "intersection operand", |a, b| a && b)
    }

    /// True when every set pixel of `self` is also set in `other`
    #[must_use]
    pub fn is_subset_of(&self, other: &Mask) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| !a || b)
    }

    /// Inclusive bounding box `(min_x, min_y, max_x, max_y)` of set pixels
    #[must_use]
    pub fn bounding_box(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for ((y, x), &set) in self.data.indexed_iter() {
            if !set {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds
    }

    /// Fail unless this mask has exactly `expected` `(width, height)`
    ///
    /// # Errors
    /// - Dimension mismatch
    pub fn ensure_dimensions(&self, expected: (u32, u32), what: &str) -> Result<()> {
        if self.dimensions() == expected {
            Ok(())
        } else {
            Err(EffectError::dimension_mismatch(
                what,
                expected,
                self.dimensions(),
            ))
        }
    }

    pub(crate) fn zip_with<F>(&self, other: &Mask, what: &str, f: F) -> Result<Mask>
    where
        F: Fn(bool, bool) -> bool,
    {
        other.ensure_dimensions(self.dimensions(), what)?;
        let mut data = self.data.clone();
        data.zip_mut_with(&other.data, |a, &b| *a = f(*a, b));
        Ok(Mask { data })
    }
}

/// Per-pixel class identifiers produced by a face-parsing model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    data: Array2<u8>,
}

impl ClassMap {
    /// Wrap a class-id array of shape `(height, width)`
    #[must_use]
    pub fn from_array(data: Array2<u8>) -> Self {
        Self { data }
    }

    /// A class map filled with a single class id
    #[must_use]
    pub fn filled(width: u32, height: u32, class_id: u8) -> Self {
        Self {
            data: Array2::from_elem((height as usize, width as usize), class_id),
        }
    }

    /// Build a class map by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> u8,
    {
        let data = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            f(x as u32, y as u32)
        });
        Self { data }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.data.ncols() as u32
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.data.nrows() as u32
    }

    /// Dimensions as `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Class id at `(x, y)`
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.data.get((y as usize, x as usize)).copied()
    }

    #[must_use]
    pub fn as_array(&self) -> &Array2<u8> {
        &self.data
    }

    /// Resample to new dimensions with nearest-neighbour lookup
    ///
    /// Class ids are categorical, so they are never interpolated.
    #[must_use]
    pub fn resize_nearest(&self, width: u32, height: u32) -> ClassMap {
        let (src_w, src_h) = self.dimensions();
        if (src_w, src_h) == (width, height) {
            return self.clone();
        }
        if src_w == 0 || src_h == 0 {
            return ClassMap::filled(width, height, 0);
        }

        let scale_x = f64::from(src_w) / f64::from(width.max(1));
        let scale_y = f64::from(src_h) / f64::from(height.max(1));
        ClassMap::from_fn(width, height, |x, y| {
            let sx = ((f64::from(x) + 0.5) * scale_x).floor() as u32;
            let sy = ((f64::from(y) + 0.5) * scale_y).floor() as u32;
            self.get(sx.min(src_w - 1), sy.min(src_h - 1)).unwrap_or(0)
        })
    }
}

/// An RGB color triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 128, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const YELLOW: Color = Color::new(255, 255, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to an `image` pixel
    #[must_use]
    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::YELLOW
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        Self::from(pixel.0)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Which effect produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Outline stroke over the original photo
    Stroke,
    /// Outline stroke with the background replaced
    StrokeWithBackground,
    /// Blurred face region
    FaceBlur,
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stroke => write!(f, "stroke"),
            Self::StrokeWithBackground => write!(f, "stroke_with_background"),
            Self::FaceBlur => write!(f, "face_blur"),
        }
    }
}

/// Per-stage timing breakdown in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Model provider invocation (segmentation or face parsing)
    pub inference_ms: u64,
    /// Mask scaling, band extraction and region mask building
    pub mask_ms: u64,
    /// Fill / blur content generation and background preparation
    pub content_ms: u64,
    /// Final layer compositing
    pub compositing_ms: u64,
    /// End-to-end duration
    pub total_ms: u64,
}

impl ProcessingTimings {
    /// One-line breakdown for logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Total: {}ms | Inference: {}ms | Mask: {}ms | Content: {}ms | Compositing: {}ms",
            self.total_ms, self.inference_ms, self.mask_ms, self.content_ms, self.compositing_ms
        )
    }
}

/// Result of applying an effect to one image
#[derive(Debug, Clone)]
pub struct EffectResult {
    /// The composited output image
    pub image: RgbImage,

    /// Region the effect content was painted into (outline band or face region)
    pub effect_mask: Mask,

    /// Which effect produced this result
    pub effect: EffectKind,

    /// Per-stage timings
    pub timings: ProcessingTimings,
}

impl EffectResult {
    /// Output dimensions as `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Save the composited image, choosing the encoder from the file extension
    ///
    /// # Errors
    /// - Unsupported extension or encoder failure
    /// - File system errors
    pub fn save<P: AsRef<Path>>(&self, path: P, jpeg_quality: u8) -> Result<()> {
        crate::services::ImageIOService::save_image(&self.image, path, jpeg_quality)
    }

    /// Consume the result, keeping only the image
    #[must_use]
    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_gray_round_trip_keeps_binary_values() {
        let mut gray = GrayImage::new(4, 3);
        gray.put_pixel(1, 2, Luma([255]));
        gray.put_pixel(3, 0, Luma([200]));
        gray.put_pixel(0, 0, Luma([100]));

        let mask = Mask::from_gray(&gray);
        assert_eq!(mask.dimensions(), (4, 3));
        assert!(mask.get(1, 2));
        assert!(mask.get(3, 0));
        assert!(!mask.get(0, 0));
        assert_eq!(mask.count(), 2);

        let back = mask.to_gray();
        assert_eq!(back.get_pixel(3, 0)[0], 255);
        assert_eq!(back.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_mask_out_of_bounds_access() {
        let mut mask = Mask::new(2, 2);
        mask.set(5, 5, true);
        assert!(mask.is_empty());
        assert!(!mask.get(5, 5));
    }

    #[test]
    fn test_mask_set_operations() {
        let a = Mask::from_fn(4, 4, |x, _| x < 2);
        let b = Mask::from_fn(4, 4, |x, _| x < 3);
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        assert_eq!(a.union(&b).unwrap(), b);
        assert_eq!(a.intersection(&b).unwrap(), a);
        assert_eq!(a.inverted().count(), 8);
    }

    #[test]
    fn test_mask_dimension_mismatch_is_rejected() {
        let a = Mask::new(4, 4);
        let b = Mask::new(4, 5);
        assert!(a.union(&b).is_err());
        assert!(!a.is_subset_of(&b));
    }

    #[test]
    fn test_bounding_box() {
        let mask = Mask::from_fn(10, 10, |x, y| (2..=5).contains(&x) && (3..=7).contains(&y));
        assert_eq!(mask.bounding_box(), Some((2, 3, 5, 7)));
        assert_eq!(Mask::new(3, 3).bounding_box(), None);
    }

    #[test]
    fn test_class_map_nearest_resize_preserves_ids() {
        let map = ClassMap::from_fn(4, 4, |x, _| if x < 2 { 1 } else { 17 });
        let up = map.resize_nearest(8, 2);
        assert_eq!(up.dimensions(), (8, 2));
        for y in 0..2 {
            for x in 0..8 {
                let expected = if x < 4 { 1 } else { 17 };
                assert_eq!(up.get(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn test_color_display_and_conversion() {
        let color = Color::from([255, 0, 128]);
        assert_eq!(color.to_string(), "#ff0080");
        assert_eq!(color.to_rgb(), Rgb([255, 0, 128]));
        assert_eq!(Color::default(), Color::YELLOW);
    }
}
