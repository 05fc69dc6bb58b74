//! Two-file commands: diff, apply, compare.

use super::{print_block, print_json, App};
use crate::render;
use anyhow::Context;
use snaptrail_snapshot::{render as html, ApplyMode, SnapshotManager};
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle `diff`.
pub async fn handle_diff(
    app: &App,
    old: &Path,
    new: &Path,
    color: bool,
    html_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let old = app.capture(old)?;
    let new = app.capture(new)?;
    let diff = app
        .manager
        .diff_engine()
        .generate(&old.raw_content, &new.raw_content);

    if let Some(out) = html_out {
        let title = format!("Diff: {} vs {}", old.source_path, new.source_path);
        tokio::fs::write(&out, html::html_page(&diff, &title))
            .await
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!(path = %out.display(), "Wrote HTML diff");
        println!("Wrote HTML diff to {}", out.display());
        return Ok(());
    }

    if diff.is_empty() {
        return Ok(());
    }
    if color {
        colored::control::set_override(true);
        print_block(&render::ansi(&diff));
    } else {
        print_block(&diff);
    }
    Ok(())
}

/// Handle `apply`.
///
/// Skipped hunks and lines are reported on stderr; the result goes to
/// `output` or stdout.
pub async fn handle_apply(
    app: &App,
    original: &Path,
    patch: &Path,
    strict: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let original = app.capture(original)?;
    let diff = tokio::fs::read_to_string(patch)
        .await
        .with_context(|| format!("Failed to read patch {}", patch.display()))?;

    let engine = app.manager.diff_engine();
    let mode = if strict {
        ApplyMode::Strict
    } else {
        engine.options().apply_mode
    };
    let applied = engine
        .apply_with(&original.raw_content, &diff, mode)
        .context("Patch does not apply")?;

    for warning in &applied.warnings {
        eprintln!("warning: {}", render::warning(warning));
    }

    match output {
        Some(out) => {
            tokio::fs::write(&out, &applied.content)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(path = %out.display(), warnings = applied.warnings.len(), "Wrote patched file");
        }
        None => print!("{}", applied.content),
    }
    Ok(())
}

/// Handle `compare`.
pub fn handle_compare(
    app: &App,
    old: &Path,
    new: &Path,
    json: bool,
    threshold: Option<f64>,
    color: bool,
) -> anyhow::Result<()> {
    let overridden;
    let manager = match threshold {
        Some(threshold) => {
            let mut analysis = app.config.analysis();
            analysis.significance.threshold = threshold;
            overridden = SnapshotManager::new(&analysis);
            &overridden
        }
        None => &app.manager,
    };

    let old = app.capture(old)?;
    let new = app.capture(new)?;
    let report = manager.compare(&old, &new);

    if json {
        return print_json(&report);
    }

    if color {
        colored::control::set_override(true);
    }
    print_block(&render::report(&report, color));
    Ok(())
}
