//! Logging initialization.

use snaptrail_util::log::{self, LogConfig};
use snaptrail_util::LogLevel;
use std::path::PathBuf;

/// Initialize logging to stderr, and to `file` when given.
///
/// `--verbose` forces debug; otherwise the configured level applies.
/// `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool, configured: LogLevel, file: Option<PathBuf>) {
    let level = if verbose {
        LogLevel::Debug
    } else {
        configured
    };

    let config = LogConfig {
        include_location: verbose,
        file,
        ..LogConfig::stderr(level)
    };

    if let Err(e) = log::init(config) {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}
