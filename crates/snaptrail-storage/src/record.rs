//! Persisted form of a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snaptrail_snapshot::{CodeMetrics, ContentCodec, Language, Snapshot, SnapshotError};
use snaptrail_util::Identifier;

/// A snapshot as stored: metadata plus the compressed content.
///
/// Only [`ContentCodec`] produces and reads `compressed_content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    /// `snp_<ulid>`; sorts in creation order.
    pub id: String,
    pub source_path: String,
    pub file_name: String,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub source_modified_at: Option<DateTime<Utc>>,
    pub content_hash: String,
    pub language: Language,
    pub size: usize,
    #[serde(default)]
    pub metrics: Option<CodeMetrics>,
    /// Snapshot of the same source this one was recorded after.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// zlib payload, base64 in JSON.
    #[serde(with = "base64_bytes")]
    pub compressed_content: Vec<u8>,
}

impl StoredSnapshot {
    /// Compress `snapshot` for storage under a fresh id.
    pub fn from_snapshot(codec: &ContentCodec, snapshot: &Snapshot) -> Result<Self, SnapshotError> {
        Ok(Self {
            id: Identifier::snapshot(),
            source_path: snapshot.source_path.clone(),
            file_name: snapshot.file_name.clone(),
            captured_at: snapshot.captured_at,
            source_modified_at: snapshot.source_modified_at,
            content_hash: snapshot.content_hash.clone(),
            language: snapshot.language.clone(),
            size: snapshot.size,
            metrics: snapshot.metrics.clone(),
            parent_id: None,
            comment: None,
            compressed_content: snapshot.compressed_content(codec)?,
        })
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Decompress and rebuild the snapshot.
    ///
    /// Fails on a corrupt payload, or when the content no longer matches
    /// `content_hash`.
    pub fn to_snapshot(&self, codec: &ContentCodec) -> Result<Snapshot, SnapshotError> {
        let raw_content = codec.decompress(&self.compressed_content)?;
        let actual = codec.hash(&raw_content);
        if actual != self.content_hash {
            return Err(SnapshotError::HashMismatch {
                expected: self.content_hash.clone(),
                actual,
            });
        }

        Ok(Snapshot {
            source_path: self.source_path.clone(),
            file_name: self.file_name.clone(),
            captured_at: self.captured_at,
            source_modified_at: self.source_modified_at,
            content_hash: self.content_hash.clone(),
            language: self.language.clone(),
            size: self.size,
            metrics: self.metrics.clone(),
            raw_content,
        })
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaptrail_snapshot::SnapshotManager;

    fn sample() -> (SnapshotManager, Snapshot) {
        let manager = SnapshotManager::default();
        let snapshot = manager.create_from_text("src/app.py", "import os\n\ndef main():\n    pass\n");
        (manager, snapshot)
    }

    #[test]
    fn restores_the_original_snapshot() {
        let (manager, snapshot) = sample();
        let stored = StoredSnapshot::from_snapshot(manager.codec(), &snapshot).unwrap();
        assert!(stored.id.starts_with("snp_"));
        assert_ne!(stored.compressed_content, snapshot.raw_content.as_bytes());

        let restored = stored.to_snapshot(manager.codec()).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn json_form_uses_base64_payload() {
        let (manager, snapshot) = sample();
        let stored = StoredSnapshot::from_snapshot(manager.codec(), &snapshot)
            .unwrap()
            .with_comment("first");
        let json = serde_json::to_value(&stored).unwrap();
        assert!(json["compressed_content"].is_string());
        assert_eq!(json["language"], "Python");
        assert!(json.get("parent_id").is_none());

        let back: StoredSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, stored);
    }

    #[test]
    fn corrupt_payload_is_a_codec_error() {
        let (manager, snapshot) = sample();
        let mut stored = StoredSnapshot::from_snapshot(manager.codec(), &snapshot).unwrap();
        stored.compressed_content.truncate(4);
        assert!(matches!(
            stored.to_snapshot(manager.codec()),
            Err(SnapshotError::Codec(_))
        ));
    }

    #[test]
    fn tampered_content_fails_hash_check() {
        let (manager, snapshot) = sample();
        let mut stored = StoredSnapshot::from_snapshot(manager.codec(), &snapshot).unwrap();
        stored.compressed_content = manager.codec().compress("something else").unwrap();
        assert!(matches!(
            stored.to_snapshot(manager.codec()),
            Err(SnapshotError::HashMismatch { .. })
        ));
    }
}
