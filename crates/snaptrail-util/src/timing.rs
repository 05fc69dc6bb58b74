//! Duration logging for snapshot and store operations.
//!
//! ```rust,ignore
//! use snaptrail_util::TimingGuard;
//!
//! fn compare(path: &str) {
//!     let _timing = TimingGuard::analysis("compare").with_subject(path);
//!     // logged when `_timing` goes out of scope
//! }
//! ```

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Which layer an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Snapshot creation, comparison and diff replay.
    Analysis,
    /// Reads and writes against a snapshot store.
    Store,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analysis => "analysis",
            Stage::Store => "store",
        }
    }

    /// Durations at or above which completion is logged at info and warn.
    fn thresholds(&self) -> (Duration, Duration) {
        match self {
            Stage::Analysis => (Duration::from_millis(100), Duration::from_secs(5)),
            Stage::Store => (Duration::from_millis(250), Duration::from_secs(10)),
        }
    }
}

/// Logs the time between its creation and drop.
///
/// Fast operations are logged at debug, slower ones at info, and very slow
/// ones at warn.
#[derive(Debug)]
pub struct TimingGuard {
    stage: Stage,
    name: String,
    subject: Option<String>,
    start: Instant,
}

impl TimingGuard {
    pub fn new(stage: Stage, name: impl Into<String>) -> Self {
        Self {
            stage,
            name: name.into(),
            subject: None,
            start: Instant::now(),
        }
    }

    /// Guard for snapshot analysis (create, compare, apply).
    pub fn analysis(name: impl Into<String>) -> Self {
        Self::new(Stage::Analysis, name)
    }

    /// Guard for a history store operation.
    pub fn store(name: impl Into<String>) -> Self {
        Self::new(Stage::Store, name)
    }

    /// Attach what the operation works on, usually a source path.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let (info_at, warn_at) = self.stage.thresholds();
        let stage = self.stage.as_str();
        let subject = self.subject.as_deref().unwrap_or("");
        let duration = format_duration(elapsed);
        let duration_ms = elapsed.as_millis() as u64;

        if elapsed >= warn_at {
            warn!(stage, operation = %self.name, subject, duration_ms, %duration, "Slow operation");
        } else if elapsed >= info_at {
            info!(stage, operation = %self.name, subject, duration_ms, %duration, "Operation finished");
        } else {
            debug!(stage, operation = %self.name, subject, duration_ms, %duration, "Operation finished");
        }
    }
}

/// `850ms`, `2.35s` or `1m 4.2s`.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    match ms {
        0..=999 => format!("{ms}ms"),
        1_000..=59_999 => format!("{:.2}s", duration.as_secs_f64()),
        _ => {
            let minutes = ms / 60_000;
            let seconds = (ms % 60_000) as f64 / 1000.0;
            format!("{minutes}m {seconds:.1}s")
        }
    }
}
