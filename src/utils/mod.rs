//! Shared utilities: color parsing, parameter validation and tensor conversion

pub mod color;
pub mod preprocessing;
pub mod validation;

pub use color::ColorParser;
pub use preprocessing::{ImagePreprocessor, Normalization, PixelScaling};
pub use validation::ParameterValidator;
