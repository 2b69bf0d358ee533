// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// CLI arguments parser.
///
/// Help and version flags are disabled: stdout only ever carries the JSON payload,
/// so `-h` or `--version` are treated as image paths like any other word. A
/// leading `--` keeps its usual meaning and ends option parsing.
#[derive(Parser, Debug)]
#[command(name = "crowd-density", about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Image to count objects in
    #[arg(value_name = "IMAGE_PATH", allow_hyphen_values = true)]
    pub image_path: Option<PathBuf>,

    /// Extra arguments, accepted and ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
}
