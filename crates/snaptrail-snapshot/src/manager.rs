//! Snapshot creation and comparison.

use crate::classify::ChangeClassifier;
use crate::codec::ContentCodec;
use crate::complexity::{self, Complexity};
use crate::config::AnalysisConfig;
use crate::diff::{Applied, DiffEngine};
use crate::language::LanguageTable;
use crate::metrics::{self, CodeMetrics};
use crate::smells::{CodeSmell, SmellDetector};
use crate::snapshot::{metrics_delta, Capture, ComparisonReport, Snapshot};
use crate::DiffError;
use chrono::{DateTime, Utc};
use snaptrail_util::path::{file_name, source_key};
use snaptrail_util::TimingGuard;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Text read from a source, with its modification time when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub content: String,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Reads source text for [`SnapshotManager::create_from_path`].
pub trait SourceReader: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<SourceText>;
}

/// Reads files from the local filesystem.
///
/// Bytes that are not valid UTF-8 are decoded as Latin-1, so any readable
/// file yields text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<SourceText> {
        let bytes = std::fs::read(path)?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), "Not UTF-8, decoding as Latin-1");
                e.into_bytes().iter().map(|&b| char::from(b)).collect()
            }
        };
        let modified_at = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(SourceText {
            content,
            modified_at,
        })
    }
}

/// What to capture: a path to read, or text supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Path(&'a Path),
    Text { path: &'a str, content: &'a str },
}

/// Builds snapshots and compares them.
///
/// Holds only configuration; every call works on its own data, so one
/// manager can be shared across threads.
#[derive(Clone)]
pub struct SnapshotManager {
    codec: ContentCodec,
    diff: DiffEngine,
    classifier: ChangeClassifier,
    smells: SmellDetector,
    languages: LanguageTable,
    reader: Arc<dyn SourceReader>,
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl std::fmt::Debug for SnapshotManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotManager")
            .field("codec", &self.codec)
            .field("diff", &self.diff)
            .field("classifier", &self.classifier)
            .field("languages", &self.languages.len())
            .finish_non_exhaustive()
    }
}

impl SnapshotManager {
    /// Create a manager reading from the filesystem.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            codec: ContentCodec::new(config.codec),
            diff: DiffEngine::new(config.diff.clone()),
            classifier: ChangeClassifier::new(config.significance),
            smells: SmellDetector::new(config.smells),
            languages: LanguageTable::with_overrides(&config.languages),
            reader: Arc::new(FsReader),
        }
    }

    /// Replace the source reader.
    pub fn with_reader(mut self, reader: Arc<dyn SourceReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn codec(&self) -> &ContentCodec {
        &self.codec
    }

    pub fn diff_engine(&self) -> &DiffEngine {
        &self.diff
    }

    pub fn classifier(&self) -> &ChangeClassifier {
        &self.classifier
    }

    /// Capture `source`.
    pub fn create(&self, source: Source<'_>) -> Capture {
        match source {
            Source::Path(path) => self.create_from_path(path),
            Source::Text { path, content } => {
                Capture::Snapshot(Box::new(self.create_from_text(path, content)))
            }
        }
    }

    /// Read `path` and capture it.
    ///
    /// Unreadable sources yield [`Capture::NoContent`] rather than an error.
    pub fn create_from_path(&self, path: &Path) -> Capture {
        let source_path = source_key(path);
        match self.reader.read(path) {
            Ok(text) => Capture::Snapshot(Box::new(self.build(
                source_path,
                &text.content,
                text.modified_at,
            ))),
            Err(e) => {
                warn!(path = %source_path, error = %e, "Source unreadable, no snapshot taken");
                Capture::NoContent {
                    source_path,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Capture text supplied by the caller under the logical name `path`.
    pub fn create_from_text(&self, path: &str, content: &str) -> Snapshot {
        self.build(path.to_string(), content, None)
    }

    fn build(
        &self,
        source_path: String,
        content: &str,
        source_modified_at: Option<DateTime<Utc>>,
    ) -> Snapshot {
        let _timing = TimingGuard::analysis("create").with_subject(source_path.as_str());

        let language = self.languages.detect(Path::new(&source_path));
        let metrics = language.is_known().then(|| metrics::analyze(content));
        let snapshot = Snapshot {
            file_name: file_name(&source_path),
            source_path,
            captured_at: Utc::now(),
            source_modified_at,
            content_hash: self.codec.hash(content),
            language,
            size: content.chars().count(),
            metrics,
            raw_content: content.to_string(),
        };

        debug!(
            path = %snapshot.source_path,
            hash = %snapshot.content_hash,
            size = snapshot.size,
            language = %snapshot.language,
            "Created snapshot"
        );
        snapshot
    }

    /// Compare two snapshots.
    pub fn compare(&self, old: &Snapshot, new: &Snapshot) -> ComparisonReport {
        let _timing = TimingGuard::analysis("compare").with_subject(new.source_path.as_str());

        let diff = self.diff.generate(&old.raw_content, &new.raw_content);
        let is_significant = self
            .classifier
            .is_significant(&old.raw_content, &new.raw_content);

        debug!(
            old = %old.content_hash,
            new = %new.content_hash,
            significant = is_significant,
            "Compared snapshots"
        );

        ComparisonReport {
            old_snapshot: old.to_ref(),
            new_snapshot: new.to_ref(),
            diff,
            is_significant,
            metrics_delta: metrics_delta(old, new),
            size_change: new.size as i64 - old.size as i64,
        }
    }

    /// Compare two captures; `None` when either side has no content.
    pub fn compare_captures(&self, old: &Capture, new: &Capture) -> Option<ComparisonReport> {
        match (old.snapshot(), new.snapshot()) {
            (Some(old), Some(new)) => Some(self.compare(old, new)),
            _ => None,
        }
    }

    /// Rebuild `snapshot`'s successor from a diff.
    pub fn apply(&self, snapshot: &Snapshot, diff: &str) -> Result<Applied, DiffError> {
        let _timing = TimingGuard::analysis("apply").with_subject(snapshot.source_path.as_str());
        self.diff.apply(&snapshot.raw_content, diff)
    }

    pub fn metrics(&self, content: &str) -> CodeMetrics {
        metrics::analyze(content)
    }

    pub fn smells(&self, content: &str) -> Vec<CodeSmell> {
        self.smells.detect(content)
    }

    pub fn complexity(&self, content: &str) -> Complexity {
        complexity::analyze(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapReader {
        files: Mutex<HashMap<String, String>>,
    }

    impl MapReader {
        fn with(path: &str, content: &str) -> Self {
            let reader = Self::default();
            if let Ok(mut files) = reader.files.lock() {
                files.insert(path.to_string(), content.to_string());
            }
            reader
        }
    }

    impl SourceReader for MapReader {
        fn read(&self, path: &Path) -> io::Result<SourceText> {
            let files = self.files.lock().map_err(|_| io::Error::other("poisoned"))?;
            files
                .get(&path.to_string_lossy().into_owned())
                .map(|content| SourceText {
                    content: content.clone(),
                    modified_at: None,
                })
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    #[test]
    fn create_from_text_fills_every_field() {
        let manager = SnapshotManager::default();
        let snap = manager.create_from_text("pkg/app.py", "def f():\n    return 1\n");
        assert_eq!(snap.file_name, "app.py");
        assert_eq!(snap.language.name(), "Python");
        assert_eq!(snap.size, 22);
        assert_eq!(snap.content_hash, manager.codec().hash(&snap.raw_content));
        assert_eq!(snap.metrics.as_ref().map(|m| m.function_count), Some(1));
        assert!(snap.source_modified_at.is_none());
    }

    #[test]
    fn unknown_language_has_no_metrics() {
        let snap = SnapshotManager::default().create_from_text("notes.txt", "hello\n");
        assert!(!snap.language.is_known());
        assert!(snap.metrics.is_none());
        assert!(snap.metric_map().is_empty());
    }

    #[test]
    fn empty_text_is_a_valid_snapshot() {
        let snap = SnapshotManager::default().create_from_text("empty.py", "");
        assert_eq!(snap.size, 0);
        assert_eq!(snap.metrics, Some(CodeMetrics::default()));
    }

    #[test]
    fn create_from_path_uses_injected_reader() {
        let manager = SnapshotManager::default()
            .with_reader(Arc::new(MapReader::with("src/a.py", "x = 1\n")));
        let capture = manager.create_from_path(Path::new("src/a.py"));
        let snap = capture.snapshot().unwrap();
        assert_eq!(snap.source_path, "src/a.py");
        assert_eq!(snap.raw_content, "x = 1\n");

        let missing = manager.create_from_path(Path::new("src/b.py"));
        assert!(matches!(
            missing,
            Capture::NoContent { ref source_path, .. } if source_path == "src/b.py"
        ));
    }

    #[test]
    fn compare_reports_diff_significance_and_deltas() {
        let manager = SnapshotManager::default();
        let old = manager.create_from_text("a.py", "def f():\n    return 1\n");
        let new = manager.create_from_text("a.py", "def f():\n    return 1\n\ndef g():\n    pass\n");
        let report = manager.compare(&old, &new);

        assert!(report.diff.contains("+def g():"));
        assert!(report.is_significant);
        assert_eq!(report.size_change, new.size as i64 - old.size as i64);
        assert_eq!(report.metrics_delta["function_count"].change, 1.0);
        assert_eq!(report.metrics_delta["class_count"].change, 0.0);
        assert_eq!(report.old_snapshot.content_hash, old.content_hash);

        let applied = manager.apply(&old, &report.diff).unwrap();
        assert_eq!(applied.content, new.raw_content);
    }

    #[test]
    fn compare_identical_snapshots() {
        let manager = SnapshotManager::default();
        let a = manager.create_from_text("a.py", "x = 1\n");
        let b = manager.create_from_text("a.py", "x = 1\n");
        let report = manager.compare(&a, &b);
        assert!(!report.has_changes());
        assert!(!report.is_significant);
        assert_eq!(report.changed_metrics().count(), 0);
    }

    #[test]
    fn compare_captures_without_content_is_empty() {
        let manager = SnapshotManager::default().with_reader(Arc::new(MapReader::default()));
        let gone = manager.create_from_path(Path::new("gone.py"));
        let here = manager.create(Source::Text {
            path: "here.py",
            content: "x\n",
        });
        assert!(manager.compare_captures(&gone, &here).is_none());
        assert!(manager.compare_captures(&gone, &gone).is_none());
        assert!(manager.compare_captures(&here, &here).is_some());
    }

    #[test]
    fn language_overrides_come_from_config() {
        let mut config = AnalysisConfig::default();
        config.languages.insert("rs".to_string(), "Rust".to_string());
        let snap = SnapshotManager::new(&config).create_from_text("lib.rs", "fn main() {}\n");
        assert_eq!(snap.language.name(), "Rust");
        assert!(snap.metrics.is_some());
    }

    #[test]
    fn fs_reader_falls_back_to_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.py");
        std::fs::write(&path, [b'c', b'a', b'f', 0xE9, b'\n']).unwrap();
        let text = FsReader.read(&path).unwrap();
        assert_eq!(text.content, "café\n");
        assert!(text.modified_at.is_some());
    }
}
