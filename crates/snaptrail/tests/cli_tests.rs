//! CLI integration tests.
//!
//! These tests exercise the CLI commands end-to-end.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const OLD: &str = "Line 1\nLine 2\nLine 3\n";
const NEW: &str = "Line 1\nLine 2 modified\nLine 3\n";

/// Get the path to the snaptrail binary.
fn binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_snaptrail")
}

/// A command running in `dir` with no config leaking in from the host.
fn snaptrail(dir: &Path) -> Command {
    let mut cmd = Command::new(binary_path());
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("XDG_DATA_HOME", dir.join(".data"))
        .env_remove("SNAPTRAIL_CONFIG_CONTENT")
        .env_remove("RUST_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    snaptrail(dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn workspace() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("old.txt"), OLD).expect("Failed to write old.txt");
    fs::write(temp.path().join("new.txt"), NEW).expect("Failed to write new.txt");
    temp
}

#[test]
fn test_help_command() {
    let temp = workspace();
    let output = run(temp.path(), &["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    for command in ["snapshot", "diff", "apply", "compare", "metrics", "smells", "track", "history"] {
        assert!(out.contains(command), "help should list {command}");
    }
}

#[test]
fn test_diff_command() {
    let temp = workspace();
    let output = run(temp.path(), &["diff", "old.txt", "new.txt"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "--- previous\n+++ current\n@@ -1,3 +1,3 @@\n Line 1\n-Line 2\n+Line 2 modified\n Line 3\n"
    );
}

#[test]
fn test_diff_identical_files_prints_nothing() {
    let temp = workspace();
    let output = run(temp.path(), &["diff", "old.txt", "old.txt"]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_diff_color_and_html() {
    let temp = workspace();
    let output = run(temp.path(), &["diff", "old.txt", "new.txt", "--color"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("\u{1b}["));

    let output = run(
        temp.path(),
        &["diff", "old.txt", "new.txt", "--html", "diff.html"],
    );
    assert!(output.status.success());
    let html = fs::read_to_string(temp.path().join("diff.html")).expect("html written");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<span class="added">+Line 2 modified</span>"#));
}

#[test]
fn test_apply_roundtrip() {
    let temp = workspace();
    let diff = run(temp.path(), &["diff", "old.txt", "new.txt"]);
    fs::write(temp.path().join("change.patch"), &diff.stdout).expect("write patch");

    let output = run(
        temp.path(),
        &["apply", "old.txt", "change.patch", "-o", "rebuilt.txt"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        fs::read_to_string(temp.path().join("rebuilt.txt")).expect("rebuilt"),
        NEW
    );
}

#[test]
fn test_apply_lenient_and_strict() {
    let temp = workspace();
    fs::write(temp.path().join("base.txt"), "a\nb\n").expect("write base");
    fs::write(
        temp.path().join("stale.patch"),
        "@@ -1,2 +1,2 @@\n a\n-stale\n+fresh\n",
    )
    .expect("write patch");

    let output = run(temp.path(), &["apply", "base.txt", "stale.patch"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a\nfresh\nb\n");
    assert!(stderr(&output).contains("warning:"));

    let output = run(temp.path(), &["apply", "base.txt", "stale.patch", "--strict"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Patch does not apply"));
}

#[test]
fn test_compare_json() {
    let temp = workspace();
    let output = run(temp.path(), &["compare", "old.txt", "new.txt", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("compare --json is JSON");
    assert_eq!(report["is_significant"], true);
    assert_eq!(report["size_change"], 9);
    assert!(report["diff"]
        .as_str()
        .expect("diff is a string")
        .contains("+Line 2 modified"));
}

#[test]
fn test_compare_threshold_override() {
    let temp = workspace();
    let output = run(
        temp.path(),
        &["compare", "old.txt", "new.txt", "--json", "--threshold", "0.99"],
    );
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(report["is_significant"], false);

    let output = run(temp.path(), &["compare", "old.txt", "new.txt"]);
    assert!(stdout(&output).contains("Significant: yes"));
}

#[test]
fn test_metrics_and_smells() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let source = format!(
        "import os\n\ndef foo():\n    # TODO: fix\n    return 1\n\nclass Bar:\n    pass\n\nx = '{}'\n",
        "a".repeat(120)
    );
    fs::write(temp.path().join("sample.py"), source).expect("write sample");

    let output = run(temp.path(), &["metrics", "sample.py", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(value["language"], "Python");
    assert_eq!(value["metrics"]["function_count"], 1);
    assert_eq!(value["metrics"]["class_count"], 1);
    assert_eq!(value["metrics"]["import_count"], 1);
    assert_eq!(value["metrics"]["todo_count"], 1);
    assert!(value["complexity"]["cyclomatic_complexity"].is_number());

    let output = run(temp.path(), &["smells", "sample.py", "--json"]);
    assert!(output.status.success());
    let smells: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    let smells = smells.as_array().expect("array");
    assert!(smells
        .iter()
        .any(|smell| smell["type"] == "long_line" && smell["line"] == 10));
}

#[test]
fn test_snapshot_json_omits_content() {
    let temp = workspace();
    fs::write(temp.path().join("main.py"), "print('hi')\n").expect("write");

    let output = run(temp.path(), &["snapshot", "main.py", "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(value["language"], "Python");
    assert_eq!(value["file_name"], "main.py");
    assert_eq!(value["content_hash"].as_str().map(str::len), Some(64));
    assert!(value.get("raw_content").is_none());
}

#[test]
fn test_missing_file_fails() {
    let temp = workspace();
    let output = run(temp.path(), &["snapshot", "nope.py"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Cannot read"));
}

#[test]
fn test_track_and_history() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let file = temp.path().join("app.py");
    fs::write(&file, "x = 1\n").expect("write");

    let track = |args: &[&str]| {
        let mut full = vec!["--store", "store", "track", "app.py"];
        full.extend_from_slice(args);
        run(temp.path(), &full)
    };

    let first = track(&["-m", "initial"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    assert!(stdout(&first).starts_with("Recorded snp_"));

    let again = track(&[]);
    assert!(stdout(&again).starts_with("Unchanged since snp_"));

    fs::write(&file, "x = 1\ny = 2\nz = 3\n").expect("rewrite");
    let second = track(&[]);
    assert!(stdout(&second).starts_with("Recorded snp_"));
    assert!(stdout(&second).contains("since snp_"));

    let list = run(
        temp.path(),
        &["--store", "store", "history", "list", "app.py", "--json"],
    );
    assert!(list.status.success());
    let records: serde_json::Value = serde_json::from_slice(&list.stdout).expect("JSON");
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["parent_id"], records[1]["id"]);
    assert_eq!(records[1]["comment"], "initial");

    let newest = records[0]["id"].as_str().expect("id");
    let oldest = records[1]["id"].as_str().expect("id");

    let show = run(
        temp.path(),
        &["--store", "store", "history", "show", newest, "--content"],
    );
    assert_eq!(stdout(&show), "x = 1\ny = 2\nz = 3\n");

    let compare = run(
        temp.path(),
        &["--store", "store", "history", "compare", oldest, newest],
    );
    assert!(compare.status.success());
    assert!(stdout(&compare).contains("+y = 2"));

    let table = run(temp.path(), &["--store", "store", "history", "list"]);
    assert!(stdout(&table).contains(newest));
    assert!(stdout(&table).contains(oldest));
}

#[test]
fn test_history_show_unknown_id() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let output = run(
        temp.path(),
        &["--store", "store", "history", "show", "snp_unknown"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Snapshot not found"));
}
