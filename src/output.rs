// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! The single JSON line printed by the `crowd-density` binary.
//!
//! Every run prints exactly one [`OutputPayload`]: either a count or an error
//! message. The text uses `", "` and `": "` separators and escapes everything
//! outside ASCII, so consumers get the same bytes regardless of locale.

use std::fmt::Display;
use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

/// Message used when no image path is given on the command line.
pub const MISSING_IMAGE_PATH: &str = "No image path provided";

/// Result of one invocation, success xor error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutputPayload {
    /// Total number of objects across all detection sets.
    Detected {
        /// Sum of detection-set sizes.
        objects_detected: usize,
    },
    /// Any failure after the model was loaded.
    Failed {
        /// Display text of the failure.
        error: String,
    },
}

impl OutputPayload {
    /// Success payload for `count` objects.
    #[must_use]
    pub const fn detected(count: usize) -> Self {
        Self::Detected {
            objects_detected: count,
        }
    }

    /// Error payload carrying the display text of `err`.
    #[must_use]
    pub fn failed(err: impl Display) -> Self {
        Self::Failed {
            error: err.to_string(),
        }
    }

    /// Error payload for a missing image path argument.
    #[must_use]
    pub fn missing_image_path() -> Self {
        Self::failed(MISSING_IMAGE_PATH)
    }

    /// Process exit code for this payload.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Detected { .. } => 0,
            Self::Failed { .. } => 1,
        }
    }

    /// Render the payload as one line of JSON, without the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only happens if serde itself fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, SpacedAsciiFormatter);
        self.serialize(&mut ser)?;
        // Every non-ASCII char was escaped above
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the payload followed by a newline and flush.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let line = self.to_json()?;
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

/// `serde_json` formatter with spaced separators and `\uXXXX` escapes for non-ASCII.
#[derive(Debug, Clone, Copy, Default)]
struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_line() {
        let payload = OutputPayload::detected(7);
        assert_eq!(payload.to_json().unwrap(), r#"{"objects_detected": 7}"#);
        assert_eq!(payload.exit_code(), 0);

        assert_eq!(OutputPayload::detected(0).to_json().unwrap(), r#"{"objects_detected": 0}"#);
    }

    #[test]
    fn test_missing_path_line() {
        let payload = OutputPayload::missing_image_path();
        assert_eq!(payload.to_json().unwrap(), r#"{"error": "No image path provided"}"#);
        assert_eq!(payload.exit_code(), 1);
    }

    #[test]
    fn test_error_message_is_escaped() {
        let payload = OutputPayload::failed("bad \"path\"\nline two");
        assert_eq!(payload.to_json().unwrap(), r#"{"error": "bad \"path\"\nline two"}"#);
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let payload = OutputPayload::failed("café 🚀");
        let json = payload.to_json().unwrap();
        assert_eq!(json, r#"{"error": "caf\u00e9 \ud83d\ude80"}"#);
        assert!(json.is_ascii());

        // Escapes decode back to the original text
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "café 🚀");
    }

    #[test]
    fn test_payload_has_exactly_one_key() {
        for payload in [OutputPayload::detected(3), OutputPayload::failed("boom")] {
            let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), 1);
            assert!(object.contains_key("objects_detected") != object.contains_key("error"));
        }
    }

    #[test]
    fn test_write_to_emits_one_line() {
        let mut out = Vec::new();
        OutputPayload::detected(12).write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "{\"objects_detected\": 12}\n");
        assert_eq!(text.lines().count(), 1);
    }
}
