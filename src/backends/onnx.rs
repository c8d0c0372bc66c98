//! ONNX Runtime model providers
//!
//! - [`OnnxSegmenter`]: u2net-family human segmentation (320x320 input)
//! - [`OnnxFaceParser`]: BiSeNet face parsing (512x512 input, 19 classes)

use crate::config::{ExecutionProvider, DEFAULT_PARSE_SIZE};
use crate::error::{EffectError, Result};
use crate::inference::{FaceParsingProvider, SegmentationProvider};
use crate::mask::post_process_mask;
use crate::types::{ClassMap, Mask};
use crate::utils::{ImagePreprocessor, Normalization};
use image::{imageops::FilterType, RgbImage};
use instant::Instant;
use ndarray::{Array4, ArrayD, Axis, Ix2, Ix3};
use ort::execution_providers::{
    CUDAExecutionProvider, CoreMLExecutionProvider, ExecutionProvider as OrtExecutionProvider,
};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::{self, value::Value};
use std::path::Path;

/// Input resolution of the u2net family
pub const SEGMENTATION_INPUT_SIZE: u32 = 320;

/// A loaded ONNX Runtime session
struct OnnxSession {
    session: Session,
    label: String,
}

impl OnnxSession {
    fn load(model_path: &Path, provider: ExecutionProvider) -> Result<Self> {
        if !model_path.is_file() {
            return Err(EffectError::provider(format!(
                "Model file '{}' does not exist",
                model_path.display()
            )));
        }

        let load_start = Instant::now();
        let mut builder = Session::builder()
            .map_err(|e| EffectError::provider(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EffectError::provider(format!("Failed to set optimization level: {e}")))?;

        let providers = match provider {
            ExecutionProvider::Cpu => Vec::new(),
            ExecutionProvider::Auto => {
                let mut providers = Vec::new();
                let cuda = CUDAExecutionProvider::default();
                if OrtExecutionProvider::is_available(&cuda).unwrap_or(false) {
                    tracing::info!("CUDA execution provider is available and will be used");
                    providers.push(cuda.build());
                }
                let coreml = CoreMLExecutionProvider::default();
                if OrtExecutionProvider::is_available(&coreml).unwrap_or(false) {
                    tracing::info!("CoreML execution provider is available and will be used");
                    providers.push(CoreMLExecutionProvider::default().with_subgraphs(true).build());
                }
                if providers.is_empty() {
                    tracing::debug!("No hardware acceleration available, using CPU");
                }
                providers
            },
            ExecutionProvider::Cuda => {
                let cuda = CUDAExecutionProvider::default();
                if OrtExecutionProvider::is_available(&cuda).unwrap_or(false) {
                    vec![cuda.build()]
                } else {
                    tracing::warn!("CUDA requested but not available, falling back to CPU");
                    Vec::new()
                }
            },
            ExecutionProvider::CoreMl => {
                let coreml = CoreMLExecutionProvider::default();
                if OrtExecutionProvider::is_available(&coreml).unwrap_or(false) {
                    vec![CoreMLExecutionProvider::default().with_subgraphs(true).build()]
                } else {
                    tracing::warn!("CoreML requested but not available, falling back to CPU");
                    Vec::new()
                }
            },
        };

        if !providers.is_empty() {
            builder = builder.with_execution_providers(providers).map_err(|e| {
                EffectError::provider(format!("Failed to set execution providers: {e}"))
            })?;
        }

        let session = builder.commit_from_file(model_path).map_err(|e| {
            EffectError::provider(format!(
                "Failed to load model '{}': {e}",
                model_path.display()
            ))
        })?;

        let label = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();
        tracing::info!(
            model = %label,
            %provider,
            "Loaded model in {}ms",
            load_start.elapsed().as_millis()
        );
        Ok(Self { session, label })
    }

    /// Run the model on `input` and return its first output
    fn run(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>> {
        let start = Instant::now();
        let input_value = Value::from_array(input)
            .map_err(|e| EffectError::provider(format!("Failed to convert input tensor: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| EffectError::provider(format!("ONNX inference failed: {e}")))?;

        let keys: Vec<_> = outputs.keys().collect();
        let first_key = keys
            .first()
            .ok_or_else(|| EffectError::provider("No output tensors found"))?;
        let output = outputs
            .get(first_key)
            .ok_or_else(|| EffectError::provider("First output tensor not found"))?
            .try_extract_array::<f32>()
            .map_err(|e| EffectError::provider(format!("Failed to extract output tensor: {e}")))?
            .to_owned();

        tracing::debug!(
            model = %self.label,
            shape = ?output.shape(),
            "Inference took {}ms",
            start.elapsed().as_millis()
        );
        Ok(output)
    }
}

/// u2net-family human segmentation
pub struct OnnxSegmenter {
    session: OnnxSession,
}

impl OnnxSegmenter {
    /// Load a segmentation model (e.g. `u2net_human_seg.onnx`)
    ///
    /// # Errors
    /// - Missing model file or session creation failure
    pub fn from_file<P: AsRef<Path>>(model_path: P, provider: ExecutionProvider) -> Result<Self> {
        Ok(Self {
            session: OnnxSession::load(model_path.as_ref(), provider)?,
        })
    }
}

impl SegmentationProvider for OnnxSegmenter {
    fn infer(&mut self, image: &RgbImage) -> Result<Mask> {
        let (width, height) = image.dimensions();
        let tensor = ImagePreprocessor::image_to_tensor(
            image,
            SEGMENTATION_INPUT_SIZE,
            FilterType::Lanczos3,
            &Normalization::imagenet_max_scaled(),
        )?;
        let output = self.session.run(tensor)?;

        let plane = match output.ndim() {
            4 => output.index_axis(Axis(0), 0).index_axis_move(Axis(0), 0),
            3 => output.index_axis(Axis(0), 0),
            2 => output.view(),
            n => {
                return Err(EffectError::provider(format!(
                    "Segmentation model returned a {n}D tensor"
                )))
            },
        };
        let plane = plane
            .into_dimensionality::<Ix2>()
            .map_err(|e| EffectError::provider(format!("Unexpected segmentation output: {e}")))?;

        let soft = ImagePreprocessor::prediction_to_gray(plane);
        let soft = image::imageops::resize(&soft, width, height, FilterType::Lanczos3);
        Ok(post_process_mask(&soft))
    }

    fn name(&self) -> &str {
        &self.session.label
    }
}

/// BiSeNet face parsing
pub struct OnnxFaceParser {
    session: OnnxSession,
    input_size: u32,
}

impl OnnxFaceParser {
    /// Load a face-parsing model (e.g. `parsing_bisenet.onnx`)
    ///
    /// # Errors
    /// - Missing model file or session creation failure
    pub fn from_file<P: AsRef<Path>>(model_path: P, provider: ExecutionProvider) -> Result<Self> {
        Ok(Self {
            session: OnnxSession::load(model_path.as_ref(), provider)?,
            input_size: DEFAULT_PARSE_SIZE,
        })
    }

    /// Override the square input resolution
    #[must_use]
    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }
}

impl FaceParsingProvider for OnnxFaceParser {
    fn infer(&mut self, image: &RgbImage) -> Result<ClassMap> {
        let tensor = ImagePreprocessor::image_to_tensor(
            image,
            self.input_size,
            FilterType::Triangle,
            &Normalization::imagenet(),
        )?;
        let output = self.session.run(tensor)?;

        let scores = match output.ndim() {
            4 => output.index_axis(Axis(0), 0),
            3 => output.view(),
            n => {
                return Err(EffectError::provider(format!(
                    "Face parser returned a {n}D tensor"
                )))
            },
        };
        let scores = scores
            .into_dimensionality::<Ix3>()
            .map_err(|e| EffectError::provider(format!("Unexpected face parser output: {e}")))?;
        ImagePreprocessor::argmax_class_map(scores)
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn name(&self) -> &str {
        &self.session.label
    }
}
