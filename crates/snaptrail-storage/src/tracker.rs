//! History policy: decides which captures are worth keeping.

use crate::{SnapshotStore, StorageError, StorageResult, StoredSnapshot};
use serde::{Deserialize, Serialize};
use snaptrail_snapshot::{Capture, ChangeClassifier, ComparisonReport, Snapshot, SnapshotManager};
use snaptrail_util::TimingGuard;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Retention and noise settings for tracked files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Older snapshots of a source beyond this count are pruned.
    pub max_snapshots_per_file: usize,
    /// Changes with a ratio below this are not recorded.
    pub min_change_threshold: f64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_snapshots_per_file: 100,
            min_change_threshold: 0.01,
        }
    }
}

/// What [`Tracker::record`] did with a capture.
#[derive(Debug, Clone)]
pub enum TrackOutcome {
    /// A new snapshot was stored.
    Saved {
        id: String,
        parent_id: Option<String>,
        /// Comparison against the previous snapshot, if there was one.
        report: Option<Box<ComparisonReport>>,
        pruned: usize,
    },
    /// Content hash matches the latest stored snapshot.
    Unchanged { latest_id: String },
    /// Content differs, but by less than `min_change_threshold`.
    BelowThreshold { latest_id: String, change_ratio: f64 },
    /// The source could not be read.
    NoContent { source_path: String, reason: String },
}

impl TrackOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Records captures into a [`SnapshotStore`].
#[derive(Clone)]
pub struct Tracker {
    store: Arc<dyn SnapshotStore>,
    manager: SnapshotManager,
    settings: StoreSettings,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("manager", &self.manager)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Tracker {
    pub fn new(store: Arc<dyn SnapshotStore>, manager: SnapshotManager, settings: StoreSettings) -> Self {
        Self {
            store,
            manager,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    pub fn manager(&self) -> &SnapshotManager {
        &self.manager
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Capture the file at `path` and record it.
    pub async fn record(&self, path: &Path, comment: Option<&str>) -> StorageResult<TrackOutcome> {
        let capture = self.manager.create_from_path(path);
        self.record_capture(capture, comment).await
    }

    /// Record caller-supplied text under the logical name `path`.
    pub async fn record_text(
        &self,
        path: &str,
        content: &str,
        comment: Option<&str>,
    ) -> StorageResult<TrackOutcome> {
        let snapshot = self.manager.create_from_text(path, content);
        self.record_capture(Capture::Snapshot(Box::new(snapshot)), comment)
            .await
    }

    /// Record a capture unless it repeats or barely changes the latest one.
    pub async fn record_capture(
        &self,
        capture: Capture,
        comment: Option<&str>,
    ) -> StorageResult<TrackOutcome> {
        let snapshot = match capture {
            Capture::Snapshot(snapshot) => snapshot,
            Capture::NoContent {
                source_path,
                reason,
            } => return Ok(TrackOutcome::NoContent { source_path, reason }),
        };
        let _timing = TimingGuard::store("record").with_subject(snapshot.source_path.as_str());

        let latest = self.store.latest(&snapshot.source_path).await?;
        let previous = match &latest {
            Some(record) => {
                if record.content_hash == snapshot.content_hash {
                    debug!(path = %snapshot.source_path, id = %record.id, "Content unchanged");
                    return Ok(TrackOutcome::Unchanged {
                        latest_id: record.id.clone(),
                    });
                }
                match record.to_snapshot(self.manager.codec()) {
                    Ok(previous) => Some(previous),
                    Err(e) => {
                        warn!(
                            id = %record.id,
                            error = %e,
                            "Latest snapshot unreadable, recording without comparison"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        if let (Some(record), Some(previous)) = (&latest, &previous) {
            if let Some(change_ratio) =
                ChangeClassifier::change_ratio(&previous.raw_content, &snapshot.raw_content)
            {
                if change_ratio < self.settings.min_change_threshold {
                    debug!(
                        path = %snapshot.source_path,
                        change_ratio,
                        threshold = self.settings.min_change_threshold,
                        "Change below threshold, not recorded"
                    );
                    return Ok(TrackOutcome::BelowThreshold {
                        latest_id: record.id.clone(),
                        change_ratio,
                    });
                }
            }
        }

        let report = previous
            .as_ref()
            .map(|previous| Box::new(self.manager.compare(previous, &snapshot)));

        let mut stored = StoredSnapshot::from_snapshot(self.manager.codec(), &snapshot)?;
        let parent_id = latest.map(|record| record.id);
        if let Some(parent) = &parent_id {
            stored = stored.with_parent(parent.clone());
        }
        if let Some(comment) = comment {
            stored = stored.with_comment(comment);
        }
        self.store.save(&stored).await?;

        let pruned = self
            .store
            .prune(&snapshot.source_path, self.settings.max_snapshots_per_file)
            .await?;

        info!(
            path = %snapshot.source_path,
            id = %stored.id,
            pruned,
            "Recorded snapshot"
        );

        Ok(TrackOutcome::Saved {
            id: stored.id,
            parent_id,
            report,
            pruned,
        })
    }

    /// Load a stored snapshot back into its full form.
    pub async fn restore(&self, id: &str) -> StorageResult<Snapshot> {
        let record = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| StorageError::not_found(id))?;
        Ok(record.to_snapshot(self.manager.codec())?)
    }

    /// Compare two stored snapshots.
    pub async fn compare(&self, old_id: &str, new_id: &str) -> StorageResult<ComparisonReport> {
        let old = self.restore(old_id).await?;
        let new = self.restore(new_id).await?;
        Ok(self.manager.compare(&old, &new))
    }

    /// Stored snapshots of `source_path`, newest first.
    pub async fn history(&self, source_path: &str) -> StorageResult<Vec<StoredSnapshot>> {
        self.store.list(Some(source_path)).await
    }
}
