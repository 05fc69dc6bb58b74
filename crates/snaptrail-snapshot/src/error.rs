//! Snapshot error types.

use thiserror::Error;

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors that can occur during snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Compressed payload could not be decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Stored hash does not match the decoded content.
    #[error("Content hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    /// Diff could not be applied.
    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// Create a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }
}

/// Errors raised while replaying a diff in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// A removed line did not match the line under the cursor.
    #[error("line {line}: expected to remove {expected:?}, found {found:?}")]
    Mismatch {
        line: usize,
        expected: String,
        found: Option<String>,
    },

    /// A hunk header could not be parsed.
    #[error("malformed hunk header: {0}")]
    MalformedHeader(String),
}
