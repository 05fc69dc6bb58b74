//! Snapshot history storage for snaptrail.
//!
//! This crate persists snapshots outside the analysis core:
//! - [`StoredSnapshot`]: the persisted record (compressed content + metadata)
//! - [`SnapshotStore`]: async storage trait with two backends,
//!   [`JsonSnapshotStore`] (one JSON file per snapshot) and
//!   [`MemorySnapshotStore`] (for testing)
//! - [`Tracker`]: records a file into a store, skipping unchanged or trivial
//!   versions and pruning old ones

pub mod error;
pub mod json;
pub mod memory;
pub mod record;
pub mod tracker;

pub use error::{StorageError, StorageResult};
pub use json::JsonSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use record::StoredSnapshot;
pub use tracker::{StoreSettings, TrackOutcome, Tracker};

use async_trait::async_trait;

/// A backend holding stored snapshots keyed by id.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert or replace a record.
    async fn save(&self, record: &StoredSnapshot) -> StorageResult<()>;

    /// Load a record. Returns `None` if the id doesn't exist.
    async fn load(&self, id: &str) -> StorageResult<Option<StoredSnapshot>>;

    /// All records, or those of one source, newest first.
    async fn list(&self, source_path: Option<&str>) -> StorageResult<Vec<StoredSnapshot>>;

    /// Remove a record. Returns whether it existed.
    async fn remove(&self, id: &str) -> StorageResult<bool>;

    /// Newest record of `source_path`.
    async fn latest(&self, source_path: &str) -> StorageResult<Option<StoredSnapshot>> {
        Ok(self.list(Some(source_path)).await?.into_iter().next())
    }

    /// Keep the `keep` newest records of `source_path` and remove the rest.
    ///
    /// Returns the number of records removed.
    async fn prune(&self, source_path: &str, keep: usize) -> StorageResult<usize> {
        let mut removed = 0;
        for record in self.list(Some(source_path)).await?.into_iter().skip(keep) {
            if self.remove(&record.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// `None` matches every record.
pub(crate) fn matches_source(source_path: Option<&str>, record: &StoredSnapshot) -> bool {
    source_path.map_or(true, |wanted| wanted == record.source_path)
}

/// Order records newest first; ids break timestamp ties.
pub(crate) fn sort_newest_first(records: &mut [StoredSnapshot]) {
    records.sort_by(|a, b| {
        b.captured_at
            .cmp(&a.captured_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
