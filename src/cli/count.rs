// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::ffi::OsString;
use std::path::Path;

use clap::Parser;

use crate::cli::args::Cli;
use crate::detector::{DetectionSet, Detector};
use crate::output::OutputPayload;

/// Run one counting invocation against an already loaded detector.
///
/// `args` is the full argument vector, program name first. The detector is only
/// called when an image path is present, and at most once. Every failure from
/// here on becomes [`OutputPayload::Failed`]; nothing is retried.
pub fn run<I, T, D>(args: I, detector: &mut D) -> OutputPayload
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    D: Detector,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => return OutputPayload::failed(e.to_string().trim_end()),
    };

    let Some(image_path) = cli.image_path else {
        return OutputPayload::missing_image_path();
    };

    match count_objects(detector, &image_path) {
        Ok(count) => OutputPayload::detected(count),
        Err(e) => OutputPayload::failed(e),
    }
}

/// Run `detector` on one path and sum the sizes of the returned sets.
///
/// # Errors
///
/// Returns the detector's error unchanged.
pub fn count_objects<D: Detector>(detector: &mut D, image_path: &Path) -> Result<usize, D::Error> {
    let sets = detector.predict(image_path)?;
    Ok(sets.iter().map(DetectionSet::count).sum())
}
