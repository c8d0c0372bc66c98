//! Model provider implementations
//!
//! - ONNX Runtime providers for segmentation and face parsing (feature `onnx`)
//! - Mock providers for unit tests

#[cfg(feature = "onnx")]
pub mod onnx;

// Test utilities for provider testing
#[cfg(test)]
pub mod test_utils;

#[cfg(feature = "onnx")]
pub use self::onnx::{OnnxFaceParser, OnnxSegmenter};
