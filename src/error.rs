//! Error types for effect compositing operations

use crate::services::ProcessingStage;
use thiserror::Error;

/// Result type alias for effect operations
pub type Result<T> = std::result::Result<T, EffectError>;

/// Coarse classification of an [`EffectError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or corrupt input, or inputs whose dimensions disagree
    InvalidInput,
    /// A caller-supplied parameter is out of range
    InvalidParameter,
    /// An external model provider failed or returned malformed output
    ProviderFailure,
}

/// Main error type for effect compositing operations
#[derive(Error, Debug)]
pub enum EffectError {
    /// Missing/corrupt input or mismatched image and mask dimensions
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid blur kernel, zoom factor, algorithm selector or similar
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Segmentation or face-parsing provider failures
    #[error("Provider failure: {0}")]
    ProviderFailure(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// An error annotated with the pipeline stage that raised it
    #[error("{stage} failed: {source}")]
    Stage {
        stage: ProcessingStage,
        #[source]
        source: Box<EffectError>,
    },
}

impl EffectError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new provider failure error
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::ProviderFailure(msg.into())
    }

    /// Create a dimension mismatch error between two named operands
    pub fn dimension_mismatch(
        what: &str,
        expected: (u32, u32),
        actual: (u32, u32),
    ) -> Self {
        Self::InvalidInput(format!(
            "{what} dimensions {}x{} do not match expected {}x{}",
            actual.0, actual.1, expected.0, expected.1
        ))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {operation} '{path_display}': {error}"),
        ))
    }

    /// Create parameter range error with the accepted range and a suggestion
    pub fn parameter_range_error<T: std::fmt::Display>(
        param_name: &str,
        value: T,
        valid_range: &str,
        suggestion: Option<&str>,
    ) -> Self {
        let mut msg = format!("{param_name} {value} is out of range (valid: {valid_range})");
        if let Some(hint) = suggestion {
            msg.push_str(&format!(", {hint}"));
        }
        Self::InvalidParameter(msg)
    }

    /// Attach the stage that produced this error
    ///
    /// Errors that already carry a stage keep their innermost stage.
    #[must_use]
    pub fn at_stage(self, stage: ProcessingStage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage that raised this error, if recorded
    #[must_use]
    pub fn stage(&self) -> Option<ProcessingStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Classify the error into one of the three terminal kinds
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Io(_) | Self::Image(_) => ErrorKind::InvalidInput,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::ProviderFailure(_) => ErrorKind::ProviderFailure,
            Self::Stage { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_unwraps_stage_context() {
        let err = EffectError::provider("model returned 3 channels")
            .at_stage(ProcessingStage::Segmentation);
        assert_eq!(err.kind(), ErrorKind::ProviderFailure);
        assert_eq!(err.stage(), Some(ProcessingStage::Segmentation));
        assert!(err.to_string().starts_with("segmentation failed"));
    }

    #[test]
    fn test_innermost_stage_is_kept() {
        let err = EffectError::invalid_parameter("kernel must be odd")
            .at_stage(ProcessingStage::ContentGeneration)
            .at_stage(ProcessingStage::Compositing);
        assert_eq!(err.stage(), Some(ProcessingStage::ContentGeneration));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = EffectError::dimension_mismatch("mask", (100, 50), (50, 100));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let msg = err.to_string();
        assert!(msg.contains("50x100"));
        assert!(msg.contains("100x50"));
    }

    #[test]
    fn test_io_errors_are_invalid_input() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = EffectError::file_io_error("read image file", "missing.png", &io);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("missing.png"));
    }
}
