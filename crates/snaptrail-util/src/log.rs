//! Subscriber setup for the snaptrail binary and tests.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Minimum level when `RUST_LOG` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Where logs go and how much detail they carry.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Emit to stderr.
    pub print: bool,
    /// Log level, used when `RUST_LOG` is not set.
    pub level: LogLevel,
    /// Add source file and line to each event.
    pub include_location: bool,
    /// Append logs to this file as well.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Stderr logging at the given level.
    pub fn stderr(level: LogLevel) -> Self {
        Self {
            print: true,
            level,
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }
}

/// Initialize logging with the given configuration.
///
/// Call once at startup. A log file that cannot be opened is reported and
/// skipped. Returns an error only when a global subscriber is already set.
pub fn init(config: LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let stderr_layer = config.print.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_level(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
    });

    let file_layer = match &config.file {
        Some(path) => match open_log_file(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            ),
            Err(e) => {
                eprintln!("Cannot open log file {}: {e}", path.display());
                None
            }
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
}

fn open_log_file(path: &Path) -> io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `snaptrail.log` under the data directory's `logs/`.
pub fn default_log_path() -> Option<PathBuf> {
    crate::path::logs_dir().map(|p| p.join("snaptrail.log"))
}
