// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Shared fixtures: a tiny detection model and blank images.
//!
//! The model ignores its pixels. It computes `sum(images * 0)` and adds that to a
//! constant `[1, 5, 3]` head holding three person candidates, two of which pass
//! the default thresholds. The bytes are written as a raw ONNX protobuf.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Model input size (height, width).
pub const FIXTURE_IMGSZ: u32 = 64;

/// Objects the fixture model reports for any image.
pub const FIXTURE_OBJECTS: usize = 2;

/// Feature-major head: cx, cy, w, h, person score for three candidates.
const HEAD: [f32; 15] = [
    12.0, 40.0, 52.0, // cx
    12.0, 40.0, 20.0, // cy
    10.0, 10.0, 10.0, // w
    10.0, 10.0, 10.0, // h
    0.9, 0.8, 0.1, // person
];

const FLOAT: i64 = 1;
const ATTR_INT: i64 = 2;

fn varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn int_field(buf: &mut Vec<u8>, field: u64, value: i64) {
    varint(buf, field << 3);
    varint(buf, value as u64);
}

fn bytes_field(buf: &mut Vec<u8>, field: u64, bytes: &[u8]) {
    varint(buf, (field << 3) | 2);
    varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn str_field(buf: &mut Vec<u8>, field: u64, value: &str) {
    bytes_field(buf, field, value.as_bytes());
}

/// `TensorProto` with float `raw_data`; no dims means a scalar.
fn tensor(name: &str, dims: &[i64], values: &[f32]) -> Vec<u8> {
    let mut buf = Vec::new();
    for &d in dims {
        int_field(&mut buf, 1, d);
    }
    int_field(&mut buf, 2, FLOAT);
    str_field(&mut buf, 8, name);
    let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    bytes_field(&mut buf, 9, &raw);
    buf
}

/// `ValueInfoProto` for a float tensor of fixed shape.
fn value_info(name: &str, dims: &[i64]) -> Vec<u8> {
    let mut shape = Vec::new();
    for &d in dims {
        let mut dim = Vec::new();
        int_field(&mut dim, 1, d);
        bytes_field(&mut shape, 1, &dim);
    }

    let mut tensor_type = Vec::new();
    int_field(&mut tensor_type, 1, FLOAT);
    bytes_field(&mut tensor_type, 2, &shape);

    let mut type_proto = Vec::new();
    bytes_field(&mut type_proto, 1, &tensor_type);

    let mut buf = Vec::new();
    str_field(&mut buf, 1, name);
    bytes_field(&mut buf, 2, &type_proto);
    buf
}

fn node(op_type: &str, inputs: &[&str], output: &str, int_attrs: &[(&str, i64)]) -> Vec<u8> {
    let mut buf = Vec::new();
    for input in inputs {
        str_field(&mut buf, 1, input);
    }
    str_field(&mut buf, 2, output);
    str_field(&mut buf, 3, output);
    str_field(&mut buf, 4, op_type);
    for &(name, value) in int_attrs {
        let mut attr = Vec::new();
        str_field(&mut attr, 1, name);
        int_field(&mut attr, 3, value);
        int_field(&mut attr, 20, ATTR_INT);
        bytes_field(&mut buf, 5, &attr);
    }
    buf
}

fn metadata_entry(key: &str, value: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    str_field(&mut buf, 1, key);
    str_field(&mut buf, 2, value);
    buf
}

/// Serialized ONNX model for the fixture detector.
pub fn counting_model_bytes() -> Vec<u8> {
    let size = i64::from(FIXTURE_IMGSZ);

    let mut graph = Vec::new();
    bytes_field(&mut graph, 1, &node("Mul", &["images", "zero"], "zeroed", &[]));
    bytes_field(&mut graph, 1, &node("ReduceSum", &["zeroed"], "offset", &[("keepdims", 0)]));
    bytes_field(&mut graph, 1, &node("Add", &["head", "offset"], "output0", &[]));
    str_field(&mut graph, 2, "counting-fixture");
    bytes_field(&mut graph, 5, &tensor("zero", &[], &[0.0]));
    bytes_field(&mut graph, 5, &tensor("head", &[1, 5, 3], &HEAD));
    bytes_field(&mut graph, 11, &value_info("images", &[1, 3, size, size]));
    bytes_field(&mut graph, 12, &value_info("output0", &[1, 5, 3]));

    let mut opset = Vec::new();
    str_field(&mut opset, 1, "");
    int_field(&mut opset, 2, 13);

    let mut model = Vec::new();
    int_field(&mut model, 1, 7);
    str_field(&mut model, 2, "crowd-density-tests");
    bytes_field(&mut model, 7, &graph);
    bytes_field(&mut model, 8, &opset);
    for (key, value) in [
        ("description", "Counting fixture"),
        ("task", "detect"),
        ("stride", "32"),
        ("batch", "1"),
        ("imgsz", "[64, 64]"),
        ("names", "{0: 'person'}"),
    ] {
        bytes_field(&mut model, 14, &metadata_entry(key, value));
    }
    model
}

/// Write the fixture model as `model.onnx` in `dir`.
pub fn write_counting_model(dir: &Path) -> PathBuf {
    let path = dir.join("model.onnx");
    std::fs::write(&path, counting_model_bytes()).unwrap();
    path
}

/// Write a black PNG of the model input size.
pub fn write_blank_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(FIXTURE_IMGSZ, FIXTURE_IMGSZ).save(&path).unwrap();
    path
}
