//! Snapshot and comparison records.

use crate::codec::ContentCodec;
use crate::error::SnapshotResult;
use crate::language::Language;
use crate::metrics::CodeMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One captured version of a text artifact.
///
/// Snapshots are values: they are built once by
/// [`SnapshotManager`](crate::SnapshotManager) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Logical identifier of the source; need not exist on disk.
    pub source_path: String,

    /// Final component of `source_path`.
    pub file_name: String,

    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,

    /// Modification time of the source, when it was read from disk.
    #[serde(default)]
    pub source_modified_at: Option<DateTime<Utc>>,

    /// Hex SHA-256 of `raw_content`.
    pub content_hash: String,

    pub language: Language,

    /// Length of `raw_content` in characters.
    pub size: usize,

    /// Present only for recognized languages.
    #[serde(default)]
    pub metrics: Option<CodeMetrics>,

    pub raw_content: String,
}

impl Snapshot {
    /// Compressed form of the content, for persistence.
    pub fn compressed_content(&self, codec: &ContentCodec) -> SnapshotResult<Vec<u8>> {
        codec.compress(&self.raw_content)
    }

    /// Metric name to value; empty when no metrics were computed.
    pub fn metric_map(&self) -> BTreeMap<&'static str, f64> {
        self.metrics
            .as_ref()
            .map(CodeMetrics::to_map)
            .unwrap_or_default()
    }

    pub fn to_ref(&self) -> SnapshotRef {
        SnapshotRef::from(self)
    }
}

/// Outcome of capturing a source: a snapshot, or an explicit marker when
/// there was nothing to capture.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    Snapshot(Box<Snapshot>),
    /// The source could not be read.
    NoContent { source_path: String, reason: String },
}

impl Capture {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            Self::NoContent { .. } => None,
        }
    }

    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(*snapshot),
            Self::NoContent { .. } => None,
        }
    }

    pub fn source_path(&self) -> &str {
        match self {
            Self::Snapshot(snapshot) => &snapshot.source_path,
            Self::NoContent { source_path, .. } => source_path,
        }
    }

    pub fn has_content(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }
}

/// Identifies the snapshot on one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRef {
    pub source_path: String,
    pub content_hash: String,
    pub captured_at: DateTime<Utc>,
}

impl From<&Snapshot> for SnapshotRef {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            source_path: snapshot.source_path.clone(),
            content_hash: snapshot.content_hash.clone(),
            captured_at: snapshot.captured_at,
        }
    }
}

/// Change of a single metric between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub old: f64,
    pub new: f64,
    pub change: f64,
}

impl MetricDelta {
    pub fn new(old: f64, new: f64) -> Self {
        Self {
            old,
            new,
            change: new - old,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.change == 0.0
    }
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub old_snapshot: SnapshotRef,
    pub new_snapshot: SnapshotRef,
    /// Unified diff from old to new; empty when the contents are identical.
    pub diff: String,
    pub is_significant: bool,
    /// Every metric present on either side; a missing side counts as 0.
    pub metrics_delta: BTreeMap<String, MetricDelta>,
    /// `new.size - old.size`.
    pub size_change: i64,
}

impl ComparisonReport {
    /// Deltas whose value actually moved.
    pub fn changed_metrics(&self) -> impl Iterator<Item = (&str, &MetricDelta)> {
        self.metrics_delta
            .iter()
            .filter(|(_, delta)| !delta.is_unchanged())
            .map(|(name, delta)| (name.as_str(), delta))
    }

    pub fn has_changes(&self) -> bool {
        !self.diff.is_empty()
    }
}

/// Per-metric deltas over the union of both metric sets.
pub(crate) fn metrics_delta(old: &Snapshot, new: &Snapshot) -> BTreeMap<String, MetricDelta> {
    let old_map = old.metric_map();
    let new_map = new.metric_map();
    old_map
        .keys()
        .chain(new_map.keys())
        .map(|name| {
            let before = old_map.get(name).copied().unwrap_or(0.0);
            let after = new_map.get(name).copied().unwrap_or(0.0);
            (name.to_string(), MetricDelta::new(before, after))
        })
        .collect()
}
