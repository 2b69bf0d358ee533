// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX model metadata parsing.
//!
//! Ultralytics exporters write `key: value` pairs into the ONNX custom metadata.
//! Only the fields needed to run a detection head are interpreted; the rest are
//! kept as strings for diagnostics.

use std::collections::HashMap;

use crate::error::{InferenceError, Result};

/// Task name used by detection models.
pub const DETECT_TASK: &str = "detect";

/// Metadata extracted from an Ultralytics YOLO ONNX model.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model description (e.g., "Ultralytics YOLO11n model trained on coco.yaml").
    pub description: String,
    /// Model author.
    pub author: String,
    /// Export date.
    pub date: String,
    /// Ultralytics version used for export.
    pub version: String,
    /// License information.
    pub license: String,
    /// Task the model was trained for (`detect`, `segment`, ...).
    pub task: String,
    /// Model stride (typically 32).
    pub stride: u32,
    /// Batch size the model was exported with.
    pub batch: usize,
    /// Input image size as (height, width).
    pub imgsz: (usize, usize),
    /// Number of input channels.
    pub channels: usize,
    /// Whether the model was exported in FP16.
    pub half: bool,
    /// Class ID to class name mapping.
    pub names: HashMap<usize, String>,
}

impl ModelMetadata {
    /// Parse metadata from `key: value` text.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::MetadataError`] when a numeric field can't be parsed.
    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let mut metadata = Self::default();

        for line in yaml_str.lines() {
            // Indented lines belong to a block (names or imgsz list)
            if line.starts_with(' ') || line.starts_with('\t') || line.starts_with('-') {
                continue;
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = unquote(value);

            match key.trim() {
                "description" => metadata.description = value.to_string(),
                "author" => metadata.author = value.to_string(),
                "date" => metadata.date = value.to_string(),
                "version" => metadata.version = value.to_string(),
                "license" => metadata.license = value.to_string(),
                "task" => metadata.task = value.to_lowercase(),
                "stride" => metadata.stride = parse_number("stride", value)?,
                "batch" => metadata.batch = parse_number("batch", value)?,
                "channels" => metadata.channels = parse_number("channels", value)?,
                "half" => metadata.half = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if let Some(imgsz) = Self::parse_imgsz(yaml_str)? {
            metadata.imgsz = imgsz;
        }
        metadata.names = Self::parse_names_block(yaml_str);

        Ok(metadata)
    }

    /// Parse `imgsz`, either inline (`[640, 640]`, `640`) or as a block list.
    fn parse_imgsz(yaml_str: &str) -> Result<Option<(usize, usize)>> {
        let lines: Vec<&str> = yaml_str.lines().collect();
        let Some(pos) = lines.iter().position(|l| l.trim_start().starts_with("imgsz:")) else {
            return Ok(None);
        };

        let inline = lines[pos].trim_start().trim_start_matches("imgsz:").trim();
        let values: Vec<usize> = if inline.is_empty() {
            lines[pos + 1..]
                .iter()
                .map(|l| l.trim())
                .take_while(|l| l.starts_with('-'))
                .map(|l| parse_number("imgsz", l.trim_start_matches('-').trim()))
                .collect::<Result<_>>()?
        } else {
            inline
                .trim_matches(|c| c == '[' || c == ']')
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| parse_number("imgsz", v))
                .collect::<Result<_>>()?
        };

        match values.as_slice() {
            [size] => Ok(Some((*size, *size))),
            [h, w, ..] => Ok(Some((*h, *w))),
            [] => Ok(None),
        }
    }

    /// Parse class names from either `names: {0: 'person', 1: 'bicycle'}` or a
    /// block map of `0: person` lines.
    fn parse_names_block(yaml_str: &str) -> HashMap<usize, String> {
        let mut names = HashMap::new();

        let Some(start) = yaml_str.find("names:") else {
            return names;
        };
        let after = yaml_str[start + "names:".len()..].trim_start();

        if let Some(dict) = after.strip_prefix('{') {
            let body = dict.split('}').next().unwrap_or_default();
            for entry in body.split(',') {
                insert_class_entry(&mut names, entry);
            }
            return names;
        }

        for line in after.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
                break;
            }
            insert_class_entry(&mut names, trimmed);
        }

        names
    }

    /// Number of classes in this model.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.names.len()
    }

    /// Get a class name by ID.
    #[must_use]
    pub fn class_name(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Whether the model has a plain detection head.
    #[must_use]
    pub fn is_detect(&self) -> bool {
        self.task == DETECT_TASK
    }

    /// Short model name for diagnostics, derived from the description.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.description
            .split_whitespace()
            .find(|w| w.to_ascii_uppercase().starts_with("YOLO"))
            .unwrap_or("YOLO")
    }
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: String::new(),
            date: String::new(),
            version: String::new(),
            license: String::new(),
            task: DETECT_TASK.to_string(),
            stride: 32,
            batch: 1,
            imgsz: (640, 640),
            channels: 3,
            half: false,
            names: HashMap::new(),
        }
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('\'').trim_matches('"')
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| InferenceError::MetadataError(format!("Invalid {key} value: {value}")))
}

fn insert_class_entry(names: &mut HashMap<usize, String>, entry: &str) {
    if let Some((key, value)) = entry.split_once(':')
        && let Ok(class_id) = key.trim().parse::<usize>()
    {
        names.insert(class_id, unquote(value).to_string());
    }
}
