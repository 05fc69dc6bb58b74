//! In-memory snapshot store for testing.

use crate::{matches_source, sort_newest_first, SnapshotStore, StorageError, StorageResult, StoredSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory snapshot store.
///
/// Records live only as long as the store does.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    records: RwLock<HashMap<String, StoredSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, across all sources.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self
            .records
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?
            .len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, record: &StoredSnapshot) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> StorageResult<Option<StoredSnapshot>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(records.get(id).cloned())
    }

    async fn list(&self, source_path: Option<&str>) -> StorageResult<Vec<StoredSnapshot>> {
        let mut matching: Vec<StoredSnapshot> = {
            let records = self
                .records
                .read()
                .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
            records
                .values()
                .filter(|record| matches_source(source_path, record))
                .cloned()
                .collect()
        };
        sort_newest_first(&mut matching);
        Ok(matching)
    }

    async fn remove(&self, id: &str) -> StorageResult<bool> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(records.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaptrail_snapshot::SnapshotManager;

    fn record(path: &str, content: &str) -> StoredSnapshot {
        let manager = SnapshotManager::default();
        let snapshot = manager.create_from_text(path, content);
        StoredSnapshot::from_snapshot(manager.codec(), &snapshot).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemorySnapshotStore::new();
        assert!(store.is_empty().unwrap());

        let rec = record("a.py", "x = 1\n");
        store.save(&rec).await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.load(&rec.id).await.unwrap(), Some(rec.clone()));

        // Saving again replaces rather than duplicates
        store.save(&rec.clone().with_comment("again")).await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(
            store.load(&rec.id).await.unwrap().unwrap().comment.as_deref(),
            Some("again")
        );

        assert!(store.remove(&rec.id).await.unwrap());
        assert!(store.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_list_and_prune() {
        let store = MemorySnapshotStore::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let rec = record("a.py", &format!("v{i}\n"));
            ids.push(rec.id.clone());
            store.save(&rec).await.unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        store.save(&record("b.py", "other\n")).await.unwrap();

        let listed: Vec<String> = store
            .list(Some("a.py"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![ids[2].clone(), ids[1].clone(), ids[0].clone()]);

        assert_eq!(store.prune("a.py", 1).await.unwrap(), 2);
        assert_eq!(store.list(None).await.unwrap().len(), 2);
        assert_eq!(store.latest("a.py").await.unwrap().unwrap().id, ids[2]);
        assert!(store.latest("c.py").await.unwrap().is_none());
    }
}
