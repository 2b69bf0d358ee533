// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Detection results.
//!
//! [`Results`] is what the ONNX backend returns per processed image. The counting
//! shim only ever asks it for [`Results::len`] through
//! [`DetectionSet`](crate::detector::DetectionSet); the box data stays available
//! to library callers.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, ArrayView2, s};

/// Detections for one processed image.
#[derive(Debug, Clone)]
pub struct Results {
    /// Original image shape (height, width).
    pub orig_shape: (u32, u32),
    /// Detection bounding boxes, `None` when nothing passed the filters.
    pub boxes: Option<Boxes>,
    /// Class ID to name mapping.
    pub names: HashMap<usize, String>,
    /// Path of the source image.
    pub path: String,
}

impl Results {
    /// Create an empty `Results` for an image.
    ///
    /// # Arguments
    ///
    /// * `orig_shape` - Original image shape (height, width).
    /// * `path` - Path to the source image.
    /// * `names` - Map of class IDs to class names.
    #[must_use]
    pub fn new(orig_shape: (u32, u32), path: String, names: HashMap<usize, String>) -> Self {
        Self {
            orig_shape,
            boxes: None,
            names,
            path,
        }
    }

    /// Number of detected objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.as_ref().map_or(0, Boxes::len)
    }

    /// Check if nothing was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Detection bounding boxes.
///
/// Rows are `[x1, y1, x2, y2, conf, cls]` in original image pixels.
#[derive(Debug, Clone)]
pub struct Boxes {
    /// Raw data array with shape (N, 6).
    pub data: Array2<f32>,
    /// Original image shape (height, width).
    pub orig_shape: (u32, u32),
}

impl Boxes {
    /// Create a new Boxes instance.
    #[must_use]
    pub fn new(data: Array2<f32>, orig_shape: (u32, u32)) -> Self {
        Self { data, orig_shape }
    }

    /// Get the number of boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Check if there are no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Boxes in xyxy format.
    #[must_use]
    pub fn xyxy(&self) -> ArrayView2<'_, f32> {
        self.data.slice(s![.., 0..4])
    }

    /// Confidence scores.
    #[must_use]
    pub fn conf(&self) -> ArrayView1<'_, f32> {
        self.data.column(4)
    }

    /// Class IDs (stored as `f32`).
    #[must_use]
    pub fn cls(&self) -> ArrayView1<'_, f32> {
        self.data.column(5)
    }
}
