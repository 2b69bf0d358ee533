// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Detection post-processing.
//!
//! Decodes the raw detection head output into [`Boxes`]: best class per
//! candidate, confidence filter, letterbox undo, per-class NMS and top-k.

use ndarray::{Array2, ArrayView2, s};

use crate::error::{InferenceError, Result};
use crate::inference::InferenceConfig;
use crate::preprocessing::{PreprocessResult, clip_coords, scale_coords};
use crate::results::Boxes;
use crate::utils::nms_per_class;

/// Layout of a detection output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DetectLayout {
    num_classes: usize,
    num_predictions: usize,
    /// `true` for `[N, 4 + nc]`, `false` for `[4 + nc, N]`.
    transposed: bool,
}

impl DetectLayout {
    const fn num_features(&self) -> usize {
        4 + self.num_classes
    }
}

/// Post-process detection model output.
///
/// YOLO detection heads output `[1, 4 + nc, N]` (e.g. `[1, 84, 8400]` for COCO);
/// some exports use `[1, N, 4 + nc]`. Both are accepted.
///
/// # Arguments
///
/// * `output` - Flat output tensor data.
/// * `output_shape` - Shape of the output tensor.
/// * `preprocess` - Letterbox info used to map boxes back to the original image.
/// * `config` - Thresholds and detection limit.
/// * `expected_classes` - Class count from metadata, `0` to infer it from the shape.
///
/// # Errors
///
/// Returns [`InferenceError::PostProcessingError`] if the shape is not a detection
/// layout or doesn't match the data length.
pub fn postprocess_detect(
    output: &[f32],
    output_shape: &[usize],
    preprocess: &PreprocessResult,
    config: &InferenceConfig,
    expected_classes: usize,
) -> Result<Boxes> {
    let layout = parse_detect_shape(output_shape, expected_classes)?;

    let expected_len = layout.num_features() * layout.num_predictions;
    if output.len() != expected_len {
        return Err(InferenceError::PostProcessingError(format!(
            "Output has {} values but shape {output_shape:?} needs {expected_len}",
            output.len()
        )));
    }

    if layout.num_predictions == 0 {
        return Ok(Boxes::new(Array2::zeros((0, 6)), preprocess.orig_shape));
    }

    let view = if layout.transposed {
        ArrayView2::from_shape((layout.num_predictions, layout.num_features()), output)
    } else {
        ArrayView2::from_shape((layout.num_features(), layout.num_predictions), output).map(|v| v.reversed_axes())
    }
    .map_err(|e| InferenceError::PostProcessingError(format!("Failed to view output: {e}")))?;

    let data = extract_detect_boxes(view, preprocess, config);
    Ok(Boxes::new(data, preprocess.orig_shape))
}

/// Work out which axis holds the features.
///
/// With known classes the axis of size `4 + nc` wins. Without metadata the
/// smaller axis is taken as features, since predictions (thousands) always
/// outnumber features for real heads.
fn parse_detect_shape(shape: &[usize], expected_classes: usize) -> Result<DetectLayout> {
    let (a, b) = match shape {
        [a, b] => (*a, *b),
        [1, a, b] => (*a, *b),
        [batch, _, _] => {
            return Err(InferenceError::PostProcessingError(format!(
                "Expected batch size 1, got {batch}"
            )));
        }
        _ => {
            return Err(InferenceError::PostProcessingError(format!(
                "Unsupported detection output shape {shape:?}"
            )));
        }
    };

    let (features, predictions, transposed) = if expected_classes > 0 && a == 4 + expected_classes {
        (a, b, false)
    } else if expected_classes > 0 && b == 4 + expected_classes {
        (b, a, true)
    } else if a <= b {
        (a, b, false)
    } else {
        (b, a, true)
    };

    if features < 5 {
        // An empty prediction axis can make the smaller axis look like features
        if predictions == 0 || features == 0 {
            return Ok(DetectLayout {
                num_classes: expected_classes.max(1),
                num_predictions: 0,
                transposed: false,
            });
        }
        return Err(InferenceError::PostProcessingError(format!(
            "Output shape {shape:?} has no class scores"
        )));
    }

    Ok(DetectLayout {
        num_classes: features - 4,
        num_predictions: predictions,
        transposed,
    })
}

/// Extract detection boxes as rows of `[x1, y1, x2, y2, conf, cls]`.
#[allow(clippy::cast_precision_loss)]
fn extract_detect_boxes(
    output: ArrayView2<'_, f32>,
    preprocess: &PreprocessResult,
    config: &InferenceConfig,
) -> Array2<f32> {
    let mut candidates = Vec::new();

    for row in output.rows() {
        // NaN scores count as zero
        let Some((best_class, best_score)) = row
            .slice(s![4..])
            .iter()
            .map(|&score| if score.is_nan() { 0.0 } else { score })
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            continue;
        };

        // Only scores strictly above the threshold count
        if best_score <= config.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        let xyxy = [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0];

        let scaled = scale_coords(&xyxy, preprocess.scale, preprocess.padding);
        candidates.push((clip_coords(&scaled, preprocess.orig_shape), best_score, best_class));
    }

    let keep = nms_per_class(&candidates, config.iou_threshold);
    let num_kept = keep.len().min(config.max_detections);

    let mut result = Array2::zeros((num_kept, 6));
    for (out_idx, &keep_idx) in keep.iter().take(num_kept).enumerate() {
        let (bbox, score, class) = &candidates[keep_idx];
        result[[out_idx, 0]] = bbox[0];
        result[[out_idx, 1]] = bbox[1];
        result[[out_idx, 2]] = bbox[2];
        result[[out_idx, 3]] = bbox[3];
        result[[out_idx, 4]] = *score;
        result[[out_idx, 5]] = *class as f32;
    }

    result
}
