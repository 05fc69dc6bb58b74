//! Single-file commands: snapshot, metrics, smells.

use super::{print_json, App};
use crate::render;
use serde_json::json;
use std::path::Path;

/// Handle `snapshot`.
pub fn handle_snapshot(app: &App, file: &Path, json: bool) -> anyhow::Result<()> {
    let snapshot = app.capture(file)?;

    if json {
        let compressed_size = snapshot.compressed_content(app.manager.codec())?.len();
        let mut value = serde_json::to_value(&snapshot)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("raw_content");
            object.insert(
                "compressed_size".to_string(),
                json!(compressed_size),
            );
        }
        return print_json(&value);
    }

    print!("{}", render::snapshot_summary(&snapshot));
    Ok(())
}

/// Handle `metrics`.
///
/// Metrics are computed for any file here, even when its language is not
/// recognized.
pub fn handle_metrics(app: &App, file: &Path, json: bool) -> anyhow::Result<()> {
    let snapshot = app.capture(file)?;
    let metrics = app.manager.metrics(&snapshot.raw_content);
    let complexity = app.manager.complexity(&snapshot.raw_content);

    if json {
        return print_json(&json!({
            "source_path": snapshot.source_path,
            "language": snapshot.language,
            "metrics": metrics,
            "complexity": complexity,
        }));
    }

    println!("{} ({})", snapshot.source_path, snapshot.language);
    println!();
    println!("Metrics:");
    print!("{}", render::metrics_table(&metrics));
    println!("Complexity:");
    print!("{}", render::complexity_table(&complexity));
    Ok(())
}

/// Handle `smells`.
pub fn handle_smells(app: &App, file: &Path, json: bool) -> anyhow::Result<()> {
    let snapshot = app.capture(file)?;
    let smells = app.manager.smells(&snapshot.raw_content);

    if json {
        return print_json(&smells);
    }

    print!("{}", render::smell_list(&smells));
    Ok(())
}
