// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # crowd-density
//!
//! Count the objects a YOLO detection model finds in one image and report the
//! total as a single line of JSON.
//!
//! ## CLI Usage
//!
//! The binary loads `model.onnx` from the working directory at startup, then
//! takes one image path:
//!
//! ```bash
//! crowd-density photo.jpg
//! # {"objects_detected": 7}
//!
//! crowd-density
//! # {"error": "No image path provided"}
//!
//! crowd-density missing.jpg
//! # {"error": "missing.jpg does not exist"}
//! ```
//!
//! | Exit code | Meaning |
//! |-----------|---------|
//! | `0` | Count printed |
//! | `1` | Error payload printed |
//! | `2` | `model.onnx` could not be loaded; diagnostic on stderr, nothing on stdout |
//!
//! ## Library Usage
//!
//! ```no_run
//! use crowd_density::{InferenceConfig, YOLOModel};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InferenceConfig::new().with_confidence(0.4);
//!     let mut model = YOLOModel::load_with_config("model.onnx", config)?;
//!
//!     let results = model.predict("crowd.jpg")?;
//!     let total: usize = results.iter().map(|r| r.len()).sum();
//!     println!("{total} objects");
//!     Ok(())
//! }
//! ```
//!
//! The counting command only depends on the [`Detector`] trait, so any backend
//! returning sets with a [`DetectionSet::count`] can be plugged into
//! [`cli::count::run`].
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cli`] | Argument parsing, counting command, stderr diagnostics |
//! | [`detector`] | [`Detector`] and [`DetectionSet`] traits |
//! | [`model`] | [`YOLOModel`] backed by ONNX Runtime |
//! | [`output`] | [`OutputPayload`] and its JSON line |
//! | [`inference`] | [`InferenceConfig`] thresholds and input size |
//! | [`results`] | [`Results`] and [`Boxes`] |
//! | [`error`] | Error types ([`InferenceError`], [`Result`]) |
//! | [`preprocessing`] | Letterbox preprocessing |
//! | [`postprocessing`] | Detection decoding and NMS |
//! | [`metadata`] | ONNX model metadata parsing |
//!
//! ## License
//!
//! Licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
pub mod cli;
pub mod detector;
pub mod error;
pub mod inference;
pub mod metadata;
pub mod model;
pub mod output;
pub mod postprocessing;
pub mod preprocessing;
pub mod results;
pub mod utils;

// Re-export main types for convenience
pub use detector::{DetectionSet, Detector};
pub use error::{InferenceError, Result};
pub use inference::{DEFAULT_MODEL, InferenceConfig};
pub use model::YOLOModel;
pub use output::OutputPayload;
pub use results::{Boxes, Results};

// Re-export metadata for advanced use
pub use metadata::ModelMetadata;

// Re-export preprocessing utilities
pub use preprocessing::{PreprocessResult, preprocess_image};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
