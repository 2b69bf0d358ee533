// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for model loading and object counting.

use std::fmt;

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Main error type for the detection backend.
#[derive(Debug)]
pub enum InferenceError {
    /// Error loading the ONNX model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error reading or decoding images. Displayed without a prefix.
    ImageError(String),
    /// Wrapped `std::io::Error`.
    Io(std::io::Error),
    /// Error parsing model metadata.
    MetadataError(String),
    /// Error decoding raw model output.
    PostProcessingError(String),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "{msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::MetadataError(msg) => write!(f, "Metadata error: {msg}"),
            Self::PostProcessingError(msg) => write!(f, "Post-processing error: {msg}"),
        }
    }
}

impl std::error::Error for InferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for InferenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for InferenceError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}
