//! Mock model providers for unit tests
//!
//! Deterministic stand-ins for the segmentation and face-parsing models so
//! the compositing pipeline can be exercised without model files or an
//! inference runtime.

use crate::{
    error::{EffectError, Result},
    inference::{FaceParsingProvider, SegmentationProvider},
    types::{ClassMap, Mask},
};
use image::RgbImage;
use std::sync::{Arc, Mutex};

type MaskFn = Box<dyn Fn(u32, u32) -> bool + Send>;
type ClassFn = Box<dyn Fn(u32, u32) -> u8 + Send>;

/// Mock segmentation provider
pub struct MockSegmenter {
    mask_fn: MaskFn,
    /// Dimensions of every image passed to `infer`
    call_history: Arc<Mutex<Vec<(u32, u32)>>>,
    should_fail: bool,
    output_override: Option<(u32, u32)>,
}

impl MockSegmenter {
    /// Segmenter whose mask is `f(x, y)` evaluated at the input's resolution
    pub fn with_mask_fn<F>(f: F) -> Self
    where
        F: Fn(u32, u32) -> bool + Send + 'static,
    {
        Self {
            mask_fn: Box::new(f),
            call_history: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
            output_override: None,
        }
    }

    /// Segmenter that always returns `mask` (regardless of input size)
    #[must_use]
    pub fn fixed(mask: Mask) -> Self {
        let dims = mask.dimensions();
        let mut segmenter = Self::with_mask_fn(move |x, y| mask.get(x, y));
        segmenter.output_override = Some(dims);
        segmenter
    }

    /// Segmenter that fails every call
    #[must_use]
    pub fn failing() -> Self {
        let mut segmenter = Self::with_mask_fn(|_, _| false);
        segmenter.should_fail = true;
        segmenter
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<(u32, u32)> {
        self.call_history.lock().unwrap().clone()
    }
}

impl SegmentationProvider for MockSegmenter {
    fn infer(&mut self, image: &RgbImage) -> Result<Mask> {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(image.dimensions());
        }
        if self.should_fail {
            return Err(EffectError::provider("Mock segmentation failed"));
        }
        let (width, height) = self.output_override.unwrap_or(image.dimensions());
        Ok(Mask::from_fn(width, height, |x, y| (self.mask_fn)(x, y)))
    }

    fn name(&self) -> &str {
        "mock-segmenter"
    }
}

/// Mock face parser
pub struct MockFaceParser {
    class_fn: ClassFn,
    input_size: u32,
    call_history: Arc<Mutex<Vec<(u32, u32)>>>,
    should_fail: bool,
}

impl MockFaceParser {
    /// Parser whose class map is `f(x, y)` at the parse resolution
    pub fn with_class_fn<F>(f: F) -> Self
    where
        F: Fn(u32, u32) -> u8 + Send + 'static,
    {
        Self {
            class_fn: Box::new(f),
            input_size: 512,
            call_history: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    /// Parser returning a single class everywhere
    #[must_use]
    pub fn filled(class_id: u8) -> Self {
        Self::with_class_fn(move |_, _| class_id)
    }

    #[must_use]
    pub fn failing() -> Self {
        let mut parser = Self::filled(0);
        parser.should_fail = true;
        parser
    }

    #[must_use]
    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }

    pub fn get_call_history(&self) -> Vec<(u32, u32)> {
        self.call_history.lock().unwrap().clone()
    }
}

impl FaceParsingProvider for MockFaceParser {
    fn infer(&mut self, image: &RgbImage) -> Result<ClassMap> {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(image.dimensions());
        }
        if self.should_fail {
            return Err(EffectError::provider("Mock face parsing failed"));
        }
        let (width, height) = image.dimensions();
        Ok(ClassMap::from_fn(width, height, |x, y| (self.class_fn)(x, y)))
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn name(&self) -> &str {
        "mock-face-parser"
    }
}
