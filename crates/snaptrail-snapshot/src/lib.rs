//! Snapshot and diff engine for snaptrail.
//!
//! Captures point-in-time versions of a text file and works out what changed
//! between two of them:
//! - [`ContentCodec`]: SHA-256 fingerprints and zlib compression
//! - [`DiffEngine`]: unified diff generation and replay
//! - [`ChangeClassifier`]: similarity-ratio significance test
//! - [`metrics`], [`smells`], [`complexity`]: line-oriented code analysis
//! - [`SnapshotManager`]: builds [`Snapshot`]s and [`ComparisonReport`]s
//!
//! Everything here is synchronous and holds no shared mutable state.
//!
//! # Example
//!
//! ```
//! use snaptrail_snapshot::SnapshotManager;
//!
//! let manager = SnapshotManager::default();
//! let old = manager.create_from_text("main.py", "Line 1\nLine 2\nLine 3\n");
//! let new = manager.create_from_text("main.py", "Line 1\nLine 2 modified\nLine 3\n");
//!
//! let report = manager.compare(&old, &new);
//! assert!(report.diff.contains("+Line 2 modified"));
//!
//! let rebuilt = manager.apply(&old, &report.diff).unwrap();
//! assert_eq!(rebuilt.content, new.raw_content);
//! ```

pub mod classify;
pub mod codec;
pub mod complexity;
pub mod config;
pub mod diff;
mod error;
pub mod language;
pub mod manager;
pub mod metrics;
pub mod render;
pub mod smells;
mod snapshot;

pub use classify::{is_significant, ChangeClassifier, SignificanceConfig};
pub use codec::{CodecConfig, ContentCodec};
pub use complexity::Complexity;
pub use config::AnalysisConfig;
pub use diff::{Applied, ApplyMode, ApplyWarning, DiffEngine, DiffOptions, HunkHeader};
pub use error::{DiffError, SnapshotError, SnapshotResult};
pub use language::{Language, LanguageTable};
pub use manager::{FsReader, SnapshotManager, Source, SourceReader, SourceText};
pub use metrics::CodeMetrics;
pub use smells::{CodeSmell, Severity, SmellDetector, SmellKind, SmellLimits};
pub use snapshot::{Capture, ComparisonReport, MetricDelta, Snapshot, SnapshotRef};
