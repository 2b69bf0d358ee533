// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the counting command through the public API

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crowd_density::cli::count::run;
use crowd_density::{Boxes, DetectionSet, Detector, InferenceError, OutputPayload, Results};
use ndarray::Array2;

/// Detector returning canned `Results`, or failing like a real model on a missing file.
struct FakeModel {
    boxes_per_image: Vec<usize>,
    seen: Vec<PathBuf>,
}

impl FakeModel {
    fn new(boxes_per_image: &[usize]) -> Self {
        Self {
            boxes_per_image: boxes_per_image.to_vec(),
            seen: Vec::new(),
        }
    }
}

impl Detector for FakeModel {
    type Output = Results;
    type Error = InferenceError;

    fn predict(&mut self, image_path: &Path) -> Result<Vec<Results>, InferenceError> {
        self.seen.push(image_path.to_path_buf());
        if image_path.to_string_lossy().starts_with("missing") {
            return Err(InferenceError::ImageError(format!(
                "{} does not exist",
                image_path.display()
            )));
        }

        let names = HashMap::from([(0, "person".to_string())]);
        Ok(self
            .boxes_per_image
            .iter()
            .map(|&n| {
                let mut result = Results::new((480, 640), image_path.display().to_string(), names.clone());
                if n > 0 {
                    result.boxes = Some(Boxes::new(Array2::zeros((n, 6)), (480, 640)));
                }
                result
            })
            .collect())
    }
}

#[test]
fn test_no_arguments() {
    let mut model = FakeModel::new(&[3]);
    let payload = run(["crowd-density"], &mut model);

    assert_eq!(payload.to_json().unwrap(), r#"{"error": "No image path provided"}"#);
    assert_eq!(payload.exit_code(), 1);
    assert!(model.seen.is_empty());
}

#[test]
fn test_photo_with_seven_people() {
    let mut model = FakeModel::new(&[7]);
    let payload = run(["crowd-density", "photo.jpg"], &mut model);

    assert_eq!(payload.to_json().unwrap(), r#"{"objects_detected": 7}"#);
    assert_eq!(payload.exit_code(), 0);
}

#[test]
fn test_empty_photo() {
    let mut model = FakeModel::new(&[0]);
    let payload = run(["crowd-density", "empty.jpg"], &mut model);

    assert_eq!(payload.to_json().unwrap(), r#"{"objects_detected": 0}"#);
    assert_eq!(payload.exit_code(), 0);
}

#[test]
fn test_missing_image_reports_error() {
    let mut model = FakeModel::new(&[7]);
    let payload = run(["crowd-density", "missing.jpg"], &mut model);

    assert_eq!(
        payload.to_json().unwrap(),
        r#"{"error": "missing.jpg does not exist"}"#
    );
    assert_eq!(payload.exit_code(), 1);
}

#[test]
fn test_results_count_through_trait() {
    let mut model = FakeModel::new(&[2, 5]);
    let sets = model.predict(Path::new("frames.jpg")).unwrap();
    let total: usize = sets.iter().map(DetectionSet::count).sum();
    assert_eq!(total, 7);

    let payload = run(["crowd-density", "frames.jpg"], &mut model);
    assert_eq!(payload, OutputPayload::detected(7));
}
