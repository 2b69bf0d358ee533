// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! [`InferenceConfig`] holds the fixed detection parameters used when counting
//! objects. The command line never changes them; library callers can through the
//! builder methods.

/// Default model artifact, resolved against the working directory.
pub const DEFAULT_MODEL: &str = "model.onnx";

/// Configuration for YOLO detection.
///
/// # Example
///
/// ```rust
/// use crowd_density::InferenceConfig;
///
/// let config = InferenceConfig::new()
///     .with_confidence(0.5)
///     .with_iou(0.45)
///     .with_max_detections(100)
///     .with_imgsz(640, 640);
/// ```
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Confidence threshold for detections (0.0 to 1.0).
    /// Candidates scoring below this value are discarded before NMS.
    pub confidence_threshold: f32,
    /// Intersection over Union (IoU) threshold for Non-Maximum Suppression (NMS).
    /// Same-class boxes overlapping a kept box by more than this are dropped.
    pub iou_threshold: f32,
    /// Maximum number of detections kept per image.
    pub max_detections: usize,
    /// Explicit input image size (height, width).
    /// If `None`, the size stored in the model metadata is used.
    pub imgsz: Option<(usize, usize)>,
    /// Number of intra-op threads for ONNX Runtime. `0` lets the runtime decide.
    pub num_threads: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            imgsz: None,
            num_threads: 0,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum confidence score (0.0 to 1.0).
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the IoU threshold for Non-Maximum Suppression (NMS).
    ///
    /// Boxes of the same class overlapping a higher-scoring box by more than this
    /// are treated as duplicates.
    #[must_use]
    pub const fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Set the maximum number of detections to keep after NMS.
    #[must_use]
    pub const fn with_max_detections(mut self, max: usize) -> Self {
        self.max_detections = max;
        self
    }

    /// Override the input image size instead of reading it from metadata.
    ///
    /// # Arguments
    ///
    /// * `height` - The target image height.
    /// * `width` - The target image width.
    #[must_use]
    pub const fn with_imgsz(mut self, height: usize, width: usize) -> Self {
        self.imgsz = Some((height, width));
        self
    }

    /// Set the number of intra-op threads. `0` means auto.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }
}
