// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Box geometry helpers used by detection post-processing.

/// Calculate `IoU` (Intersection over Union) between two bounding boxes.
///
/// # Arguments
///
/// * `box1` - First bounding box [x1, y1, x2, y2]
/// * `box2` - Second bounding box [x1, y1, x2, y2]
///
/// # Returns
///
/// `IoU` value between 0.0 and 1.0
#[must_use]
pub fn calculate_iou(box1: &[f32; 4], box2: &[f32; 4]) -> f32 {
    let x1 = box1[0].max(box2[0]);
    let y1 = box1[1].max(box2[1]);
    let x2 = box1[2].min(box2[2]);
    let y2 = box1[3].min(box2[3]);

    let intersection = ((x2 - x1).max(0.0)) * ((y2 - y1).max(0.0));

    let area1 = (box1[2] - box1[0]) * (box1[3] - box1[1]);
    let area2 = (box2[2] - box2[0]) * (box2[3] - box2[1]);
    let union = area1 + area2 - intersection;

    if union > 0.0 { intersection / union } else { 0.0 }
}

/// Per-class Non-Maximum Suppression.
///
/// Boxes only suppress other boxes of the same class. Candidates are visited in
/// descending score order, so the returned indices are sorted by score as well.
///
/// # Arguments
///
/// * `boxes` - Candidates as `(bbox, score, class_id)`
/// * `iou_threshold` - `IoU` above which a lower-scoring box is dropped
///
/// # Returns
///
/// Indices into `boxes` of the detections to keep
#[must_use]
pub fn nms_per_class(boxes: &[([f32; 4], f32, usize)], iou_threshold: f32) -> Vec<usize> {
    if boxes.is_empty() {
        return vec![];
    }

    let mut indices: Vec<usize> = (0..boxes.len()).collect();
    indices.sort_by(|&a, &b| boxes[b].1.total_cmp(&boxes[a].1));

    let mut keep = vec![];
    let mut suppressed = vec![false; boxes.len()];

    for &i in &indices {
        if suppressed[i] {
            continue;
        }
        keep.push(i);

        let (bbox_i, _, class_i) = &boxes[i];
        for &j in &indices {
            if suppressed[j] || i == j || boxes[j].2 != *class_i {
                continue;
            }
            if calculate_iou(bbox_i, &boxes[j].0) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical_boxes() {
        let b = [0.0, 0.0, 10.0, 10.0];
        assert!((calculate_iou(&b, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_and_partial() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [20.0, 20.0, 30.0, 30.0];
        assert!(calculate_iou(&a, &b).abs() < 1e-6);

        // Overlap is 5x10 = 50, union is 150
        let c = [5.0, 0.0, 15.0, 10.0];
        assert!((calculate_iou(&a, &c) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_degenerate_boxes() {
        let p = [3.0, 3.0, 3.0, 3.0];
        assert!(calculate_iou(&p, &p).abs() < 1e-6);
    }

    #[test]
    fn test_nms_suppresses_same_class_overlap() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.8, 0),
            ([1.0, 1.0, 11.0, 11.0], 0.9, 0),
            ([50.0, 50.0, 60.0, 60.0], 0.7, 0),
        ];
        let keep = nms_per_class(&boxes, 0.45);
        assert_eq!(keep, vec![1, 2]);
    }

    #[test]
    fn test_nms_keeps_overlap_across_classes() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.9, 0),
            ([0.0, 0.0, 10.0, 10.0], 0.8, 1),
        ];
        let keep = nms_per_class(&boxes, 0.45);
        assert_eq!(keep, vec![0, 1]);
    }

    #[test]
    fn test_nms_empty_and_nan() {
        assert!(nms_per_class(&[], 0.5).is_empty());

        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], f32::NAN, 0),
            ([20.0, 20.0, 30.0, 30.0], 0.5, 0),
        ];
        assert_eq!(nms_per_class(&boxes, 0.5).len(), 2);
    }
}
