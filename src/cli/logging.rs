// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Diagnostics for the terminal.
//!
//! Stdout is reserved for the JSON payload, so every message here goes to stderr.

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }}
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}
