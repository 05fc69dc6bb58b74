//! History integration tests: tracker over the JSON store on disk.

use snaptrail_snapshot::{AnalysisConfig, SnapshotError, SnapshotManager};
use snaptrail_storage::{
    JsonSnapshotStore, SnapshotStore, StorageError, StoreSettings, StoredSnapshot, TrackOutcome,
    Tracker,
};
use std::sync::Arc;
use tempfile::TempDir;

fn tracker_at(dir: &std::path::Path, settings: StoreSettings) -> Tracker {
    Tracker::new(
        Arc::new(JsonSnapshotStore::new(dir)),
        SnapshotManager::new(&AnalysisConfig::default()),
        settings,
    )
}

#[tokio::test]
async fn test_history_survives_reopening_the_store() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store_dir = temp.path().join("history");
    let source = temp.path().join("app.py");

    std::fs::write(&source, "def main():\n    pass\n").expect("write");
    let first = tracker_at(&store_dir, StoreSettings::default())
        .record(&source, Some("first"))
        .await
        .expect("record");
    assert!(first.is_saved());

    // A fresh tracker sees what the previous one stored.
    let tracker = tracker_at(&store_dir, StoreSettings::default());
    let again = tracker.record(&source, None).await.expect("record");
    assert!(matches!(again, TrackOutcome::Unchanged { .. }));

    std::fs::write(&source, "def main():\n    print('hello world')\n    return 0\n")
        .expect("rewrite");
    let outcome = tracker.record(&source, None).await.expect("record");
    let TrackOutcome::Saved {
        id,
        parent_id,
        report,
        ..
    } = outcome
    else {
        panic!("expected a new snapshot, got {outcome:?}");
    };
    let report = report.expect("comparison against the previous snapshot");
    assert!(report.is_significant);
    assert!(report.diff.contains("+    print('hello world')"));

    let history = tracker
        .history(&snaptrail_util::path::source_key(&source))
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, id);
    assert_eq!(history[0].parent_id, parent_id);
    assert_eq!(history[1].comment.as_deref(), Some("first"));

    let restored = tracker.restore(&id).await.expect("restore");
    assert_eq!(
        restored.raw_content,
        "def main():\n    print('hello world')\n    return 0\n"
    );
}

#[tokio::test]
async fn test_records_are_plain_json_files() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let tracker = tracker_at(temp.path(), StoreSettings::default());

    let TrackOutcome::Saved { id, .. } = tracker
        .record_text("notes.md", "# Notes\n", None)
        .await
        .expect("record")
    else {
        panic!("first record should be saved");
    };

    let raw = std::fs::read_to_string(temp.path().join(format!("{id}.json"))).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    assert_eq!(value["source_path"], "notes.md");
    assert_eq!(value["language"], "Markdown");
    assert!(value["compressed_content"].is_string());
    assert!(!temp.path().join(format!("{id}.json.tmp")).exists());
}

#[tokio::test]
async fn test_corrupt_record_is_reported_on_restore() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = JsonSnapshotStore::new(temp.path());
    let manager = SnapshotManager::default();

    let snapshot = manager.create_from_text("a.py", "x = 1\n");
    let mut record = StoredSnapshot::from_snapshot(manager.codec(), &snapshot).expect("compress");
    record.compressed_content = b"garbage".to_vec();
    store.save(&record).await.expect("save");

    let tracker = Tracker::new(Arc::new(store), manager, StoreSettings::default());
    let err = tracker.restore(&record.id).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Snapshot(SnapshotError::Codec(_))
    ));

    // Tracking still works: the unreadable latest snapshot is not compared.
    let outcome = tracker
        .record_text("a.py", "x = 2\n", None)
        .await
        .expect("record");
    match outcome {
        TrackOutcome::Saved {
            parent_id, report, ..
        } => {
            assert_eq!(parent_id.as_deref(), Some(record.id.as_str()));
            assert!(report.is_none());
        }
        other => panic!("expected Saved, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pruning_keeps_newest() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let tracker = tracker_at(
        temp.path(),
        StoreSettings {
            max_snapshots_per_file: 3,
            min_change_threshold: 0.0,
        },
    );

    let mut saved = Vec::new();
    for i in 0..5 {
        let content = format!("value = {}\n", "9".repeat(i + 1));
        if let TrackOutcome::Saved { id, .. } =
            tracker.record_text("a.py", &content, None).await.expect("record")
        {
            saved.push(id);
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    assert_eq!(saved.len(), 5);

    let kept: Vec<String> = tracker
        .history("a.py")
        .await
        .expect("history")
        .into_iter()
        .map(|r| r.id)
        .collect();
    let newest: Vec<String> = saved.iter().rev().take(3).cloned().collect();
    assert_eq!(kept, newest);
}

fn service_module(functions: usize) -> String {
    let mut source = String::from("\"\"\"Request handlers.\"\"\"\nimport json\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            "def handle_{i}(request):\n    payload = json.loads(request.body)\n    return {{\"id\": {i}, \"ok\": payload is not None}}\n\n"
        ));
    }
    source
}

#[tokio::test]
async fn test_multi_kb_source_restores_and_compares() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let original = service_module(120);
    assert!(original.len() > 8_000);
    let edited = original.replace(
        "def handle_57(request):\n",
        "def handle_57(request, strict=False):\n",
    );

    let tracker = tracker_at(
        temp.path(),
        StoreSettings {
            max_snapshots_per_file: 10,
            min_change_threshold: 0.0,
        },
    );
    let TrackOutcome::Saved { id: first, .. } = tracker
        .record_text("svc/handlers.py", &original, None)
        .await
        .expect("record")
    else {
        panic!("first record should be saved");
    };

    let outcome = tracker
        .record_text("svc/handlers.py", &edited, Some("strict flag"))
        .await
        .expect("record");
    let TrackOutcome::Saved {
        id: second,
        parent_id,
        report,
        ..
    } = outcome
    else {
        panic!("expected a new snapshot, got {outcome:?}");
    };
    assert_eq!(parent_id.as_deref(), Some(first.as_str()));
    let report = report.expect("the stored predecessor decodes and is compared");
    assert!(report.diff.contains("+def handle_57(request, strict=False):"));

    assert_eq!(tracker.restore(&first).await.expect("restore").raw_content, original);
    assert_eq!(tracker.restore(&second).await.expect("restore").raw_content, edited);

    let compared = tracker.compare(&first, &second).await.expect("compare");
    assert_eq!(compared.diff, report.diff);
}

#[tokio::test]
async fn test_one_line_edit_of_large_source_is_compared_under_default_policy() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let original = service_module(120);
    let edited = original.replace("\"id\": 57,", "\"id\": 5700,");

    let tracker = tracker_at(temp.path(), StoreSettings::default());
    tracker
        .record_text("svc/handlers.py", &original, None)
        .await
        .expect("record");

    match tracker
        .record_text("svc/handlers.py", &edited, None)
        .await
        .expect("record")
    {
        TrackOutcome::BelowThreshold { change_ratio, .. } => {
            assert!(change_ratio < StoreSettings::default().min_change_threshold);
        }
        TrackOutcome::Saved { report, .. } => {
            assert!(report.is_some(), "predecessor should decode");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}
