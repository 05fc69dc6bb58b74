//! JSON file-based snapshot store.
//!
//! Each snapshot is a separate JSON file named after its id:
//! `snp_01hq....json` under the base directory.

use crate::{matches_source, sort_newest_first, SnapshotStore, StorageError, StorageResult, StoredSnapshot};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// JSON file-based snapshot store.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    base_path: PathBuf,
}

impl JsonSnapshotStore {
    /// Create a store rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for an id.
    fn id_to_path(&self, id: &str) -> StorageResult<PathBuf> {
        if id.is_empty()
            || id.contains('/')
            || id.contains('\\')
            || id == "."
            || id == ".."
            || id.starts_with('.')
        {
            return Err(StorageError::invalid_key(format!("Invalid snapshot id: {id}")));
        }
        Ok(self.base_path.join(format!("{id}.json")))
    }

    async fn read_record(path: &Path) -> StorageResult<Option<StoredSnapshot>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn save(&self, record: &StoredSnapshot) -> StorageResult<()> {
        let path = self.id_to_path(&record.id)?;
        debug!(path = %path.display(), source = %record.source_path, "Writing snapshot");

        fs::create_dir_all(&self.base_path).await?;
        let content = serde_json::to_string_pretty(record)?;

        // Write atomically (write to temp file, then rename)
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn load(&self, id: &str) -> StorageResult<Option<StoredSnapshot>> {
        let path = self.id_to_path(id)?;
        debug!(path = %path.display(), "Reading snapshot");
        Self::read_record(&path).await
    }

    async fn list(&self, source_path: Option<&str>) -> StorageResult<Vec<StoredSnapshot>> {
        debug!(path = %self.base_path.display(), "Listing snapshots");
        let mut records = Vec::new();

        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(StorageError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // Only include .json files; leftover .json.tmp files are skipped too.
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let record = match Self::read_record(&path).await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable snapshot file");
                    continue;
                }
            };
            if matches_source(source_path, &record) {
                records.push(record);
            }
        }

        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn remove(&self, id: &str) -> StorageResult<bool> {
        let path = self.id_to_path(id)?;
        debug!(path = %path.display(), "Removing snapshot");

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Create a store at the default history directory.
pub fn default_store() -> Option<JsonSnapshotStore> {
    snaptrail_util::path::history_dir().map(JsonSnapshotStore::new)
}
