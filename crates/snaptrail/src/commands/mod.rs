//! Command handlers for the snaptrail CLI.
//!
//! - `analyze`: snapshot, metrics and smells of a single file
//! - `diff`: diff, apply and compare between two files
//! - `history`: track files into a store and inspect what was recorded

pub mod analyze;
pub mod diff;
pub mod history;
pub mod logging;

pub use analyze::*;
pub use diff::*;
pub use history::*;
pub use logging::*;

use crate::config::Config;
use anyhow::bail;
use snaptrail_snapshot::{Capture, Snapshot, SnapshotManager};
use std::path::Path;

/// Loaded configuration plus the engine built from it.
pub struct App {
    pub config: Config,
    pub manager: SnapshotManager,
}

impl App {
    pub fn new(config: Config) -> Self {
        let manager = SnapshotManager::new(&config.analysis());
        Self { config, manager }
    }

    /// Snapshot `path`, failing when it cannot be read.
    pub fn capture(&self, path: &Path) -> anyhow::Result<Snapshot> {
        match self.manager.create_from_path(path) {
            Capture::Snapshot(snapshot) => Ok(*snapshot),
            Capture::NoContent {
                source_path,
                reason,
            } => bail!("Cannot read {source_path}: {reason}"),
        }
    }
}

/// Pretty JSON to stdout.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print text, adding a final newline if it lacks one.
fn print_block(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}
