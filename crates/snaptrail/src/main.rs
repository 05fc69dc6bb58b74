//! Snaptrail - file snapshots, diffs and change history.
//!
//! This is the main entry point for the snaptrail CLI.

mod commands;
mod config;
mod render;

use clap::{Parser, Subcommand};
use commands::{
    handle_apply, handle_compare, handle_diff, handle_history, handle_metrics, handle_smells,
    handle_snapshot, handle_track, init_logging, App, HistoryCommands,
};
use config::Config;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "snaptrail")]
#[command(author, version, about = "File snapshots, diffs and change history", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Snapshot store directory for track/history
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a snapshot of a file and print its summary
    Snapshot {
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Unified diff between two files
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Colour the output
        #[arg(long)]
        color: bool,
        /// Write an HTML page to this path instead of printing
        #[arg(long, value_name = "OUT")]
        html: Option<PathBuf>,
    },
    /// Apply a unified diff to a file
    Apply {
        original: PathBuf,
        patch: PathBuf,
        /// Fail on the first mismatch instead of skipping it
        #[arg(long)]
        strict: bool,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare two files: diff, significance and metric changes
    Compare {
        old: PathBuf,
        new: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Significance threshold (0-1) for this run
        #[arg(long)]
        threshold: Option<f64>,
        /// Colour the diff
        #[arg(long)]
        color: bool,
    },
    /// Line metrics and complexity of a file
    Metrics {
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Code smells in a file
    Smells {
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a file into the snapshot history
    Track {
        file: PathBuf,
        /// Note stored with the snapshot
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Inspect the snapshot history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    let (config, sources) = Config::load(Some(&cwd)).await?;
    init_logging(cli.verbose, config.log_level(), config.log_file());
    for source in &sources {
        tracing::debug!(path = %source.display(), "Loaded config");
    }

    let app = App::new(config);
    let store = cli.store;

    match cli.command {
        Commands::Snapshot { file, json } => handle_snapshot(&app, &file, json),
        Commands::Diff {
            old,
            new,
            color,
            html,
        } => handle_diff(&app, &old, &new, color, html).await,
        Commands::Apply {
            original,
            patch,
            strict,
            output,
        } => handle_apply(&app, &original, &patch, strict, output).await,
        Commands::Compare {
            old,
            new,
            json,
            threshold,
            color,
        } => handle_compare(&app, &old, &new, json, threshold, color),
        Commands::Metrics { file, json } => handle_metrics(&app, &file, json),
        Commands::Smells { file, json } => handle_smells(&app, &file, json),
        Commands::Track { file, message } => handle_track(&app, store, &file, message).await,
        Commands::History { command } => handle_history(&app, store, command).await,
        Commands::Config => show_config(&app, &sources, store.as_deref()),
    }
}

/// Print the merged configuration and where it came from.
fn show_config(app: &App, sources: &[PathBuf], store: Option<&Path>) -> anyhow::Result<()> {
    if sources.is_empty() {
        println!("Config sources: (defaults)");
    } else {
        println!("Config sources:");
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();

    let store_dir = store
        .map(Path::to_path_buf)
        .or_else(|| app.config.resolved_store_dir());
    let effective = serde_json::json!({
        "log_level": app.config.log_level(),
        "store_dir": store_dir,
        "analysis": app.config.analysis(),
        "history": app.config.store_settings(),
    });
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}
