// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for counting objects.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! stderr diagnostics and the counting command implementation.

// Modules
/// CLI arguments.
pub mod args;

/// Counting logic.
pub mod count;

/// Stderr logging macros.
pub mod logging;
