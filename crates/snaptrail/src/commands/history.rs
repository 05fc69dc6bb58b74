//! History commands: track files and inspect recorded snapshots.

use super::{print_block, print_json, App};
use crate::render;
use anyhow::{bail, Context};
use clap::Subcommand;
use snaptrail_storage::{JsonSnapshotStore, TrackOutcome, Tracker};
use snaptrail_util::path::source_key;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// History subcommands.
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recorded snapshots, newest first
    List {
        /// Only snapshots of this file
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one recorded snapshot
    Show {
        /// Snapshot ID
        id: String,
        /// Print the stored file content instead of the summary
        #[arg(long)]
        content: bool,
    },
    /// Compare two recorded snapshots
    Compare {
        /// Older snapshot ID
        old_id: String,
        /// Newer snapshot ID
        new_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Colour the diff
        #[arg(long)]
        color: bool,
    },
}

/// Build a tracker over the JSON store at `store_dir`, or the configured one.
pub fn open_tracker(app: &App, store_dir: Option<PathBuf>) -> anyhow::Result<Tracker> {
    let Some(dir) = store_dir.or_else(|| app.config.resolved_store_dir()) else {
        bail!("No history directory available; pass --store or set store_dir in config");
    };
    tracing::debug!(path = %dir.display(), "Opening snapshot store");

    Ok(Tracker::new(
        Arc::new(JsonSnapshotStore::new(dir)),
        app.manager.clone(),
        app.config.store_settings(),
    ))
}

/// Handle `track`.
pub async fn handle_track(
    app: &App,
    store_dir: Option<PathBuf>,
    file: &Path,
    comment: Option<String>,
) -> anyhow::Result<()> {
    let tracker = open_tracker(app, store_dir)?;
    let outcome = tracker
        .record(file, comment.as_deref())
        .await
        .with_context(|| format!("Failed to record {}", file.display()))?;

    match outcome {
        TrackOutcome::Saved {
            id,
            parent_id,
            report,
            pruned,
        } => {
            println!("Recorded {id}");
            if let (Some(parent), Some(report)) = (parent_id, report) {
                println!(
                    "  since {parent}: size {:+}, {}",
                    report.size_change,
                    if report.is_significant {
                        "significant"
                    } else {
                        "minor"
                    }
                );
            }
            if pruned > 0 {
                println!("  pruned {pruned} old snapshot(s)");
            }
        }
        TrackOutcome::Unchanged { latest_id } => {
            println!("Unchanged since {latest_id}");
        }
        TrackOutcome::BelowThreshold {
            latest_id,
            change_ratio,
        } => {
            println!(
                "Change ratio {change_ratio:.4} below threshold {}; not recorded (latest {latest_id})",
                tracker.settings().min_change_threshold
            );
        }
        TrackOutcome::NoContent {
            source_path,
            reason,
        } => bail!("Cannot read {source_path}: {reason}"),
    }
    Ok(())
}

/// Handle history commands.
pub async fn handle_history(
    app: &App,
    store_dir: Option<PathBuf>,
    command: HistoryCommands,
) -> anyhow::Result<()> {
    let tracker = open_tracker(app, store_dir)?;

    match command {
        HistoryCommands::List { file, json } => {
            let source = file.as_deref().map(source_key);
            let records = tracker.store().list(source.as_deref()).await?;

            if json {
                let summaries: Vec<_> = records
                    .iter()
                    .map(|record| {
                        serde_json::json!({
                            "id": record.id,
                            "source_path": record.source_path,
                            "captured_at": record.captured_at,
                            "content_hash": record.content_hash,
                            "size": record.size,
                            "parent_id": record.parent_id,
                            "comment": record.comment,
                        })
                    })
                    .collect();
                return print_json(&summaries);
            }

            if records.is_empty() {
                println!("No snapshots found.");
            } else {
                print!("{}", render::history_table(&records));
            }
        }
        HistoryCommands::Show { id, content } => {
            let Some(record) = tracker.store().load(&id).await? else {
                bail!("Snapshot not found: {id}");
            };
            if content {
                let snapshot = record
                    .to_snapshot(tracker.manager().codec())
                    .with_context(|| format!("Snapshot {id} is corrupt"))?;
                print!("{}", snapshot.raw_content);
            } else {
                print!("{}", render::record_details(&record));
            }
        }
        HistoryCommands::Compare {
            old_id,
            new_id,
            json,
            color,
        } => {
            let report = tracker.compare(&old_id, &new_id).await?;
            if json {
                return print_json(&report);
            }
            if color {
                colored::control::set_override(true);
            }
            print_block(&render::report(&report, color));
        }
    }
    Ok(())
}
