//! Errors from snapshot stores and the tracker.

use snaptrail_snapshot::SnapshotError;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a record file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored payload could not be turned back into a snapshot.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// No snapshot with this id.
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    /// An id that cannot name a record file.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The in-memory store's lock was poisoned.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StorageError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }
}
