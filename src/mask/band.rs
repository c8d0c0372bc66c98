//! Outline band extraction

use crate::config::ScaleSpec;
use crate::error::Result;
use crate::mask::MaskScaler;
use crate::types::Mask;

/// The three masks that describe an outline around a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineMasks {
    /// Un-scaled subject silhouette
    pub subject: Mask,
    /// Silhouette after scaling about the center
    pub scaled: Mask,
    /// Pixels set in exactly one of `subject` and `scaled`
    pub band: Mask,
}

/// Derives the outline band between a mask and its scaled counterpart
pub struct OutlineBandExtractor;

impl OutlineBandExtractor {
    /// Symmetric difference of `original` and `scaled`
    ///
    /// The band is a subset of `original ∪ scaled` and is empty exactly when
    /// the two masks are equal.
    ///
    /// # Errors
    /// - Masks with different dimensions
    pub fn extract(original: &Mask, scaled: &Mask) -> Result<Mask> {
        original.zip_with(scaled, "scaled mask", |a, b| a ^ b)
    }

    /// Scale `subject` with `spec` and extract the band in one step
    ///
    /// # Errors
    /// - Any error from [`MaskScaler::scale`]
    pub fn outline(subject: &Mask, spec: &ScaleSpec) -> Result<OutlineMasks> {
        let scaled = MaskScaler::scale(subject, spec)?;
        let band = Self::extract(subject, &scaled)?;
        Ok(OutlineMasks {
            subject: subject.clone(),
            scaled,
            band,
        })
    }
}
