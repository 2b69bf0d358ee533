// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! The detection capability seen by the counting command.
//!
//! The command only needs two things from a detector: run it once on a path, and
//! ask each returned set how many objects it holds. Everything else about the
//! backend (tensors, boxes, class names) stays behind these traits.

use std::fmt::Display;
use std::path::Path;

use crate::error::InferenceError;
use crate::model::YOLOModel;
use crate::results::Results;

/// Detections for one processed image, seen only through their count.
pub trait DetectionSet {
    /// Number of detected objects.
    fn count(&self) -> usize;
}

/// Something that can run object detection on an image path.
pub trait Detector {
    /// Per-image detection set.
    type Output: DetectionSet;
    /// Failure type; only its `Display` text reaches the user.
    type Error: Display;

    /// Run detection on the image at `image_path`.
    ///
    /// Returns one detection set per processed image. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Any failure to read, decode or run the image.
    fn predict(&mut self, image_path: &Path) -> Result<Vec<Self::Output>, Self::Error>;
}

impl DetectionSet for Results {
    fn count(&self) -> usize {
        self.len()
    }
}

impl Detector for YOLOModel {
    type Output = Results;
    type Error = InferenceError;

    fn predict(&mut self, image_path: &Path) -> Result<Vec<Results>, InferenceError> {
        Self::predict(self, image_path)
    }
}
