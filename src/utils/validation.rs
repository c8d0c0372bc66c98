//! Parameter validation utilities
//!
//! Range checks for the numeric knobs of the effects. Everything here
//! returns `InvalidParameter` on rejection.

use crate::error::{EffectError, Result};

/// Conventional zoom factor range that produces a visible but thin outline
pub const CONVENTIONAL_ZOOM_RANGE: std::ops::RangeInclusive<f32> = 1.0..=1.10;

/// Validator for effect parameters
pub struct ParameterValidator;

impl ParameterValidator {
    /// Validate a mask scale factor: finite and strictly positive
    ///
    /// Factors outside `(1.00, 1.10]` are accepted but logged, since they
    /// produce either no band or a very thick one.
    ///
    /// # Errors
    /// - Non-finite or non-positive factor
    pub fn validate_zoom_factor(factor: f32) -> Result<f32> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(EffectError::parameter_range_error(
                "Zoom factor",
                factor,
                "> 0",
                Some("values between 1.01 and 1.09 give a thin outline"),
            ));
        }
        if factor <= *CONVENTIONAL_ZOOM_RANGE.start() || factor > *CONVENTIONAL_ZOOM_RANGE.end() {
            tracing::debug!(factor, "Zoom factor outside the conventional (1.00, 1.10] range");
        }
        Ok(factor)
    }

    /// Validate a rotation angle in degrees
    ///
    /// # Errors
    /// - Non-finite angle
    pub fn validate_angle(angle: f32) -> Result<f32> {
        if angle.is_finite() {
            Ok(angle)
        } else {
            Err(EffectError::invalid_parameter(format!(
                "Rotation angle must be finite, got {angle}"
            )))
        }
    }

    /// Validate a box-blur kernel side length: positive and odd
    ///
    /// # Errors
    /// - Zero or even kernel size
    pub fn validate_blur_kernel(kernel_size: u32) -> Result<u32> {
        if kernel_size == 0 {
            return Err(EffectError::parameter_range_error(
                "Blur kernel size",
                kernel_size,
                "positive odd integer",
                None,
            ));
        }
        if kernel_size % 2 == 0 {
            return Err(EffectError::parameter_range_error(
                "Blur kernel size",
                kernel_size,
                "positive odd integer",
                Some(&format!("try {}", kernel_size + 1)),
            ));
        }
        Ok(kernel_size)
    }

    /// Validate a signed blur kernel as received from user input
    ///
    /// # Errors
    /// - Negative, zero or even kernel size
    pub fn validate_blur_kernel_i64(kernel_size: i64) -> Result<u32> {
        let kernel = u32::try_from(kernel_size).map_err(|_| {
            EffectError::parameter_range_error(
                "Blur kernel size",
                kernel_size,
                "positive odd integer",
                None,
            )
        })?;
        Self::validate_blur_kernel(kernel)
    }

    /// Validate a class allow-list
    ///
    /// # Errors
    /// - Empty list
    pub fn validate_class_ids(class_ids: &[u8]) -> Result<()> {
        if class_ids.is_empty() {
            return Err(EffectError::invalid_parameter(
                "Class allow-list must contain at least one class id",
            ));
        }
        Ok(())
    }

    /// Validate quality setting (0-100)
    ///
    /// # Errors
    /// - Quality above 100
    pub fn validate_quality(value: u8) -> Result<u8> {
        if value > 100 {
            return Err(EffectError::parameter_range_error(
                "Quality", value, "0-100", None,
            ));
        }
        Ok(value)
    }
}
