//! Configuration types for effect operations

use crate::error::{EffectError, Result};
use crate::types::Color;
use crate::utils::ParameterValidator;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Class identifiers treated as face/skin by the BiSeNet face parser
pub const FACE_CLASS_IDS: [u8; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 17];

/// Default zoom factor used to derive the outline band
pub const DEFAULT_ZOOM_FACTOR: f32 = 1.03;

/// Default box-blur kernel side length
pub const DEFAULT_BLUR_KERNEL: u32 = 33;

/// Square resolution the face parser expects
pub const DEFAULT_PARSE_SIZE: u32 = 512;

/// Algorithm used to scale a mask about its center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleAlgorithm {
    /// Affine rotate + scale around the center, Lanczos-4 resampling
    #[default]
    RotateScale,
    /// Center crop by the factor, resized back with bilinear filtering
    CropResize,
}

impl std::fmt::Display for ScaleAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RotateScale => write!(f, "rotate_scale"),
            Self::CropResize => write!(f, "crop_resize"),
        }
    }
}

impl FromStr for ScaleAlgorithm {
    type Err = EffectError;

    /// Accepts the algorithm names and the legacy numeric selectors `1` and `2`
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotate_scale" | "rotate-scale" | "1" => Ok(Self::RotateScale),
            "crop_resize" | "crop-resize" | "2" => Ok(Self::CropResize),
            other => Err(EffectError::invalid_parameter(format!(
                "Unsupported scale algorithm '{other}' (expected rotate_scale or crop_resize)"
            ))),
        }
    }
}

impl TryFrom<u8> for ScaleAlgorithm {
    type Error = EffectError;

    fn try_from(selector: u8) -> Result<Self> {
        match selector {
            1 => Ok(Self::RotateScale),
            2 => Ok(Self::CropResize),
            other => Err(EffectError::invalid_parameter(format!(
                "Unsupported scale algorithm selector {other} (expected 1 or 2)"
            ))),
        }
    }
}

/// How a mask is scaled to derive the outline band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleSpec {
    /// Scale factor, must be finite and > 0
    pub factor: f32,
    /// Rotation in degrees, counter-clockwise (only used by `RotateScale`)
    pub angle: f32,
    /// Scaling algorithm
    pub algorithm: ScaleAlgorithm,
}

impl ScaleSpec {
    /// Create a validated scale spec
    ///
    /// # Errors
    /// - Non-positive or non-finite factor
    /// - Non-finite angle
    pub fn new(factor: f32, angle: f32, algorithm: ScaleAlgorithm) -> Result<Self> {
        let spec = Self {
            factor,
            angle,
            algorithm,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Rotate-scale spec with no rotation
    ///
    /// # Errors
    /// - Non-positive or non-finite factor
    pub fn zoom(factor: f32) -> Result<Self> {
        Self::new(factor, 0.0, ScaleAlgorithm::RotateScale)
    }

    /// Validate factor and angle
    ///
    /// # Errors
    /// - Non-positive or non-finite factor
    /// - Non-finite angle
    pub fn validate(&self) -> Result<()> {
        ParameterValidator::validate_zoom_factor(self.factor)?;
        ParameterValidator::validate_angle(self.angle)?;
        Ok(())
    }
}

impl Default for ScaleSpec {
    fn default() -> Self {
        Self {
            factor: DEFAULT_ZOOM_FACTOR,
            angle: 0.0,
            algorithm: ScaleAlgorithm::RotateScale,
        }
    }
}

/// Outline stroke settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    /// Stroke color
    pub color: Color,
    /// Mask scaling used to derive the band
    pub scale: ScaleSpec,
}

/// Face blur settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Box-blur kernel side length, positive and odd
    pub kernel_size: u32,
    /// Class identifiers that make up the blurred region
    pub class_ids: Vec<u8>,
    /// Square resolution images are resized to before face parsing
    pub parse_size: u32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_BLUR_KERNEL,
            class_ids: FACE_CLASS_IDS.to_vec(),
            parse_size: DEFAULT_PARSE_SIZE,
        }
    }
}

/// Intermediate image dumps for visual debugging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Write stage images when true
    pub enabled: bool,
    /// Directory the stage images are written to
    pub directory: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("debug"),
        }
    }
}

/// Execution provider options for ONNX Runtime model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionProvider {
    /// Auto-detect best available provider (CUDA > `CoreML` > CPU)
    #[default]
    Auto,
    /// CPU execution (always available)
    Cpu,
    /// NVIDIA CUDA GPU acceleration
    Cuda,
    /// Apple Silicon GPU acceleration
    CoreMl,
}

impl std::fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

impl FromStr for ExecutionProvider {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda),
            "coreml" => Ok(Self::CoreMl),
            other => Err(EffectError::invalid_parameter(format!(
                "Unknown execution provider '{other}' (expected auto, cpu, cuda or coreml)"
            ))),
        }
    }
}

/// Configuration for effect operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Outline stroke settings
    pub stroke: StrokeConfig,

    /// Face blur settings
    pub blur: BlurConfig,

    /// Debug image dumps
    pub debug: DebugConfig,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,

    /// Execution provider for model providers
    pub execution_provider: ExecutionProvider,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            stroke: StrokeConfig::default(),
            blur: BlurConfig::default(),
            debug: DebugConfig::default(),
            jpeg_quality: 90,
            execution_provider: ExecutionProvider::default(),
        }
    }
}

impl EffectConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use socialfx::{Color, EffectConfig, ScaleAlgorithm};
    ///
    /// let config = EffectConfig::builder()
    ///     .stroke_color(Color::new(255, 0, 0))
    ///     .zoom_factor(1.05)
    ///     .scale_algorithm(ScaleAlgorithm::RotateScale)
    ///     .blur_kernel(25)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.blur.kernel_size, 25);
    /// ```
    #[must_use]
    pub fn builder() -> EffectConfigBuilder {
        EffectConfigBuilder::default()
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    ///
    /// # Errors
    /// - File cannot be read
    /// - Malformed JSON
    /// - Invalid parameter values
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EffectError::file_io_error("read config file", path, &e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            EffectError::invalid_parameter(format!(
                "Malformed config file '{}': {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Non-positive or non-finite zoom factor, non-finite angle
    /// - Blur kernel that is zero or even
    /// - Empty class allow-list or zero parse size
    /// - JPEG quality above 100
    pub fn validate(&self) -> Result<()> {
        self.stroke.scale.validate()?;
        ParameterValidator::validate_blur_kernel(self.blur.kernel_size)?;
        ParameterValidator::validate_class_ids(&self.blur.class_ids)?;
        if self.blur.parse_size == 0 {
            return Err(EffectError::invalid_parameter(
                "Face parse size must be positive",
            ));
        }
        ParameterValidator::validate_quality(self.jpeg_quality)?;
        Ok(())
    }
}

/// Builder for `EffectConfig`
#[derive(Debug, Default)]
pub struct EffectConfigBuilder {
    config: EffectConfig,
}

impl EffectConfigBuilder {
    /// Start from an existing configuration
    #[must_use]
    pub fn from_config(config: EffectConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn stroke_color(mut self, color: Color) -> Self {
        self.config.stroke.color = color;
        self
    }

    #[must_use]
    pub fn zoom_factor(mut self, factor: f32) -> Self {
        self.config.stroke.scale.factor = factor;
        self
    }

    #[must_use]
    pub fn angle(mut self, degrees: f32) -> Self {
        self.config.stroke.scale.angle = degrees;
        self
    }

    #[must_use]
    pub fn scale_algorithm(mut self, algorithm: ScaleAlgorithm) -> Self {
        self.config.stroke.scale.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn blur_kernel(mut self, kernel_size: u32) -> Self {
        self.config.blur.kernel_size = kernel_size;
        self
    }

    #[must_use]
    pub fn class_ids(mut self, class_ids: Vec<u8>) -> Self {
        self.config.blur.class_ids = class_ids;
        self
    }

    #[must_use]
    pub fn parse_size(mut self, size: u32) -> Self {
        self.config.blur.parse_size = size;
        self
    }

    /// Enable debug dumps into `directory`
    #[must_use]
    pub fn debug_dir<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.config.debug.enabled = true;
        self.config.debug.directory = directory.into();
        self
    }

    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug.enabled = enabled;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.min(100);
        self
    }

    #[must_use]
    pub fn execution_provider(mut self, provider: ExecutionProvider) -> Self {
        self.config.execution_provider = provider;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - Any parameter rejected by [`EffectConfig::validate`]
    pub fn build(self) -> Result<EffectConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_follow_original_tool() {
        let config = EffectConfig::default();
        assert_eq!(config.stroke.color, Color::YELLOW);
        assert!((config.stroke.scale.factor - 1.03).abs() < f32::EPSILON);
        assert_eq!(config.stroke.scale.algorithm, ScaleAlgorithm::RotateScale);
        assert_eq!(config.blur.kernel_size, 33);
        assert_eq!(config.blur.class_ids.len(), 16);
        assert!(!config.blur.class_ids.contains(&16));
        assert!(!config.debug.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!(
            "rotate_scale".parse::<ScaleAlgorithm>().unwrap(),
            ScaleAlgorithm::RotateScale
        );
        assert_eq!(
            "crop-resize".parse::<ScaleAlgorithm>().unwrap(),
            ScaleAlgorithm::CropResize
        );
        assert_eq!(ScaleAlgorithm::try_from(2).unwrap(), ScaleAlgorithm::CropResize);

        let err = "3".parse::<ScaleAlgorithm>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(ScaleAlgorithm::try_from(3).is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_parameters() {
        assert!(EffectConfig::builder().zoom_factor(0.0).build().is_err());
        assert!(EffectConfig::builder().zoom_factor(-1.1).build().is_err());
        assert!(EffectConfig::builder().zoom_factor(f32::NAN).build().is_err());
        assert!(EffectConfig::builder().blur_kernel(0).build().is_err());
        assert!(EffectConfig::builder().blur_kernel(24).build().is_err());
        assert!(EffectConfig::builder().class_ids(vec![]).build().is_err());
        assert!(EffectConfig::builder().parse_size(0).build().is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = EffectConfig::builder()
            .stroke_color(Color::RED)
            .zoom_factor(1.08)
            .angle(5.0)
            .scale_algorithm(ScaleAlgorithm::CropResize)
            .debug_dir("/tmp/fx-debug")
            .jpeg_quality(150)
            .execution_provider(ExecutionProvider::Cpu)
            .build()
            .unwrap();

        assert_eq!(config.stroke.color, Color::RED);
        assert_eq!(config.stroke.scale.algorithm, ScaleAlgorithm::CropResize);
        assert!(config.debug.enabled);
        assert_eq!(config.debug.directory, PathBuf::from("/tmp/fx-debug"));
        assert_eq!(config.jpeg_quality, 100);
        assert_eq!(config.execution_provider, ExecutionProvider::Cpu);
    }

    #[test]
    fn test_config_json_partial_uses_defaults() {
        let json = r#"{ "stroke": { "color": { "r": 0, "g": 255, "b": 0 },
                        "scale": { "factor": 1.1, "angle": 0.0, "algorithm": "crop_resize" } } }"#;
        let config: EffectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.stroke.color, Color::new(0, 255, 0));
        assert_eq!(config.stroke.scale.algorithm, ScaleAlgorithm::CropResize);
        assert_eq!(config.blur, BlurConfig::default());
    }

    #[test]
    fn test_execution_provider_parsing() {
        assert_eq!("CUDA".parse::<ExecutionProvider>().unwrap(), ExecutionProvider::Cuda);
        assert_eq!(ExecutionProvider::CoreMl.to_string(), "coreml");
        assert!("tpu".parse::<ExecutionProvider>().is_err());
    }
}
