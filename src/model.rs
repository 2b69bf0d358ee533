// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! YOLO model loading and inference.
//!
//! This module provides [`YOLOModel`], an ONNX Runtime session around an
//! Ultralytics detection export, plus the metadata needed to pre- and
//! post-process images for it.

use std::collections::HashMap;
use std::path::Path;

use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;

use crate::error::{InferenceError, Result};
use crate::inference::InferenceConfig;
use crate::metadata::ModelMetadata;
use crate::postprocessing::postprocess_detect;
use crate::preprocessing::preprocess_image;
use crate::results::Results;
use crate::warn;

/// Custom metadata keys written by the Ultralytics ONNX exporter.
const METADATA_KEYS: [&str; 12] = [
    "description",
    "author",
    "date",
    "version",
    "license",
    "stride",
    "task",
    "batch",
    "imgsz",
    "names",
    "half",
    "channels",
];

/// YOLO detection model.
///
/// # Example
///
/// ```no_run
/// use crowd_density::YOLOModel;
///
/// let mut model = YOLOModel::load("model.onnx")?;
/// let results = model.predict("image.jpg")?;
/// let total: usize = results.iter().map(|r| r.len()).sum();
/// println!("{total} objects");
/// # Ok::<(), crowd_density::InferenceError>(())
/// ```
pub struct YOLOModel {
    /// ONNX Runtime session.
    session: Session,
    /// Model metadata (task, classes, input size).
    metadata: ModelMetadata,
    /// Input tensor name.
    input_name: String,
    /// Detection output tensor name.
    output_name: String,
    /// Inference configuration.
    config: InferenceConfig,
}

impl YOLOModel {
    /// Load a YOLO model from an ONNX file with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::ModelLoadError`] if the file doesn't exist, can't be
    /// loaded by ONNX Runtime, or isn't a detection model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, InferenceConfig::default())
    }

    /// Load a YOLO model with a custom configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `config` - Inference configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::ModelLoadError`] if the file doesn't exist, can't be
    /// loaded by ONNX Runtime, or isn't a detection model.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: InferenceConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InferenceError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| {
                InferenceError::ModelLoadError(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                InferenceError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                InferenceError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let metadata = match Self::extract_metadata(&session)? {
            Some(metadata) => metadata,
            None => {
                warn!(
                    "{} has no Ultralytics metadata, using defaults (imgsz=640, classes from output shape)",
                    path.display()
                );
                ModelMetadata::default()
            }
        };

        if !metadata.is_detect() {
            return Err(InferenceError::ModelLoadError(format!(
                "Unsupported task '{}': only detection models can count objects",
                metadata.task
            )));
        }

        let imgsz = config.imgsz.unwrap_or(metadata.imgsz);
        if imgsz.0 == 0 || imgsz.1 == 0 {
            return Err(InferenceError::ModelLoadError(format!(
                "Invalid input size {}x{}",
                imgsz.0, imgsz.1
            )));
        }

        let input_name = session
            .inputs
            .first()
            .map_or_else(|| "images".to_string(), |i| i.name.clone());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::ModelLoadError("Model has no outputs".to_string()))?;

        let config = InferenceConfig {
            imgsz: Some(imgsz),
            ..config
        };

        Ok(Self {
            session,
            metadata,
            input_name,
            output_name,
            config,
        })
    }

    /// Read Ultralytics metadata from the session, `None` if the model carries none.
    fn extract_metadata(session: &Session) -> Result<Option<ModelMetadata>> {
        let model_metadata = session.metadata().map_err(|e| {
            InferenceError::ModelLoadError(format!("Failed to get model metadata: {e}"))
        })?;

        // Each key is stored separately; join them into one key: value document
        let lines: Vec<String> = METADATA_KEYS
            .iter()
            .filter_map(|key| match model_metadata.custom(key) {
                Ok(Some(value)) => Some(format!("{key}: {value}")),
                _ => None,
            })
            .collect();

        if lines.is_empty() {
            return Ok(None);
        }

        ModelMetadata::from_yaml_str(&lines.join("\n")).map(Some)
    }

    /// Run detection on an image file.
    ///
    /// # Returns
    ///
    /// One [`Results`] for the image.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::ImageError`] if the path doesn't exist or can't be
    /// decoded, or an inference/post-processing error from the model.
    pub fn predict<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<Results>> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InferenceError::ImageError(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let img = image::open(path)?;

        self.predict_image(&img, path.to_string_lossy().into_owned())
    }

    /// Run detection on an already decoded image.
    ///
    /// # Arguments
    ///
    /// * `image` - The image to run inference on.
    /// * `path` - Identifier stored in the result.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, inference or post-processing fails.
    pub fn predict_image(&mut self, image: &DynamicImage, path: String) -> Result<Vec<Results>> {
        let target_size = self.config.imgsz.unwrap_or(self.metadata.imgsz);

        let preprocess = preprocess_image(image, target_size)?;
        let (output, output_shape) = self.run_inference(&preprocess.tensor)?;

        let boxes = postprocess_detect(
            &output,
            &output_shape,
            &preprocess,
            &self.config,
            self.metadata.num_classes(),
        )?;

        let mut result = Results::new(preprocess.orig_shape, path, self.metadata.names.clone());
        if !boxes.is_empty() {
            result.boxes = Some(boxes);
        }

        Ok(vec![result])
    }

    /// Run the ONNX session on a preprocessed tensor.
    fn run_inference(&mut self, input: &Array4<f32>) -> Result<(Vec<f32>, Vec<usize>)> {
        let input_contiguous = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous).map_err(|e| {
            InferenceError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| InferenceError::InferenceError(format!("Inference failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            InferenceError::InferenceError(format!("Output '{}' not found", self.output_name))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::InferenceError(format!("Failed to extract output: {e}")))?;

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let shape: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();

        Ok((data.to_vec(), shape))
    }

    /// Get the model's class names.
    #[must_use]
    pub fn names(&self) -> &HashMap<usize, String> {
        &self.metadata.names
    }

    /// Get the number of classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.metadata.num_classes()
    }

    /// Get the input size used for inference (height, width).
    #[must_use]
    pub fn imgsz(&self) -> (usize, usize) {
        self.config.imgsz.unwrap_or(self.metadata.imgsz)
    }

    /// Get the model's stride.
    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.metadata.stride
    }

    /// Get the model metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for YOLOModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YOLOModel")
            .field("model", &self.metadata.model_name())
            .field("task", &self.metadata.task)
            .field("num_classes", &self.metadata.num_classes())
            .field("imgsz", &self.imgsz())
            .finish_non_exhaustive()
    }
}
