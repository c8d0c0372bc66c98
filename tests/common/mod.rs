//! Shared fixtures for integration tests
//!
//! Deterministic model providers built on the public provider traits, plus
//! small image and mask builders.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use socialfx::{
    ClassMap, EffectError, FaceParsingProvider, Mask, Result, SegmentationProvider,
};

/// Segmenter returning a mask computed from pixel coordinates at the input's size
pub struct FnSegmenter<F> {
    mask_fn: F,
    pub calls: usize,
}

impl<F> FnSegmenter<F>
where
    F: Fn(u32, u32, u32, u32) -> bool,
{
    /// `mask_fn(x, y, width, height)` decides membership
    pub fn new(mask_fn: F) -> Self {
        Self { mask_fn, calls: 0 }
    }
}

impl<F> SegmentationProvider for FnSegmenter<F>
where
    F: Fn(u32, u32, u32, u32) -> bool,
{
    fn infer(&mut self, image: &RgbImage) -> Result<Mask> {
        self.calls += 1;
        let (w, h) = image.dimensions();
        Ok(Mask::from_fn(w, h, |x, y| (self.mask_fn)(x, y, w, h)))
    }

    fn name(&self) -> &str {
        "fn-segmenter"
    }
}

/// Segmenter that returns a fixed mask whatever the input
pub struct FixedSegmenter(pub Mask);

impl SegmentationProvider for FixedSegmenter {
    fn infer(&mut self, _image: &RgbImage) -> Result<Mask> {
        Ok(self.0.clone())
    }
}

/// Segmenter that always fails
pub struct FailingSegmenter;

impl SegmentationProvider for FailingSegmenter {
    fn infer(&mut self, _image: &RgbImage) -> Result<Mask> {
        Err(EffectError::provider("model session is gone"))
    }
}

/// Face parser returning a class map computed from normalized coordinates
///
/// The function receives `(x, y)` scaled to `[0, 1)` so the same layout
/// holds at the parser's square resolution and after resizing back.
pub struct FnFaceParser<F> {
    class_fn: F,
    input_size: u32,
    pub seen: Vec<(u32, u32)>,
}

impl<F> FnFaceParser<F>
where
    F: Fn(f32, f32) -> u8,
{
    pub fn new(class_fn: F) -> Self {
        Self {
            class_fn,
            input_size: 64,
            seen: Vec::new(),
        }
    }

    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }
}

impl<F> FaceParsingProvider for FnFaceParser<F>
where
    F: Fn(f32, f32) -> u8,
{
    fn infer(&mut self, image: &RgbImage) -> Result<ClassMap> {
        let (w, h) = image.dimensions();
        self.seen.push((w, h));
        Ok(ClassMap::from_fn(w, h, |x, y| {
            (self.class_fn)(x as f32 / w as f32, y as f32 / h as f32)
        }))
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }
}

/// Parser whose output ignores the requested resolution
pub struct WrongSizeFaceParser;

impl FaceParsingProvider for WrongSizeFaceParser {
    fn infer(&mut self, _image: &RgbImage) -> Result<ClassMap> {
        Ok(ClassMap::filled(7, 7, 1))
    }

    fn input_size(&self) -> u32 {
        16
    }
}

/// Square of side `side` centered in a `size` x `size` mask
pub fn centered_square(size: u32, side: u32) -> Mask {
    let start = (size - side) / 2;
    let end = start + side;
    Mask::from_fn(size, size, |x, y| {
        (start..end).contains(&x) && (start..end).contains(&y)
    })
}

/// Image with a distinct color at every pixel
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

/// Horizontal stripes, so blurring changes interior pixels
pub fn striped_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |_, y| {
        if y % 4 < 2 {
            Rgb([250, 250, 250])
        } else {
            Rgb([5, 5, 5])
        }
    })
}
