//! Model provider abstraction
//!
//! The compositing core never talks to an inference runtime directly. It is
//! handed a provider with a single `infer` method and treats the result as
//! untrusted: outputs with the wrong dimensions are rejected as provider
//! failures.

use crate::config::DEFAULT_PARSE_SIZE;
use crate::error::{EffectError, Result};
use crate::types::{ClassMap, Mask};
use image::RgbImage;

/// Produces a binary subject mask for an image
pub trait SegmentationProvider {
    /// Segment `image`; the mask must have the image's dimensions
    ///
    /// # Errors
    /// - Model inference failures
    /// - Malformed model output
    fn infer(&mut self, image: &RgbImage) -> Result<Mask>;

    /// Short provider name for logs
    fn name(&self) -> &str {
        "segmentation"
    }
}

/// Produces a per-pixel class map for a face image
pub trait FaceParsingProvider {
    /// Parse `image`, which has already been resized to `input_size()` squared
    ///
    /// # Errors
    /// - Model inference failures
    /// - Malformed model output
    fn infer(&mut self, image: &RgbImage) -> Result<ClassMap>;

    /// Canonical square resolution the parser expects
    fn input_size(&self) -> u32 {
        DEFAULT_PARSE_SIZE
    }

    /// Short provider name for logs
    fn name(&self) -> &str {
        "face-parsing"
    }
}

/// Reject provider output whose dimensions differ from what was requested
///
/// # Errors
/// - `ProviderFailure` on mismatch
pub fn ensure_output_dimensions(
    provider: &str,
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EffectError::provider(format!(
            "{provider} returned {}x{} output for a {}x{} input",
            actual.0, actual.1, expected.0, expected.1
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::{MockFaceParser, MockSegmenter};
    use crate::error::ErrorKind;

    #[test]
    fn test_providers_as_trait_objects() {
        let mut segmenter: Box<dyn SegmentationProvider> =
            Box::new(MockSegmenter::with_mask_fn(|x, _| x > 1));
        let mask = segmenter.infer(&RgbImage::new(4, 2)).unwrap();
        assert_eq!(mask.dimensions(), (4, 2));
        assert_eq!(mask.count(), 4);

        let parser: Box<dyn FaceParsingProvider> = Box::new(MockFaceParser::filled(0));
        assert_eq!(parser.input_size(), 512);
    }

    #[test]
    fn test_output_dimension_check() {
        assert!(ensure_output_dimensions("u2net", (4, 4), (4, 4)).is_ok());
        let err = ensure_output_dimensions("u2net", (4, 4), (320, 320)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderFailure);
        assert!(err.to_string().contains("320x320"));
    }
}
