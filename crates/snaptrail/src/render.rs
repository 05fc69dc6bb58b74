//! Terminal rendering of diffs, reports and analysis results.

use colored::Colorize;
use snaptrail_snapshot::{
    ApplyWarning, CodeMetrics, CodeSmell, ComparisonReport, Complexity, Severity, Snapshot,
};
use snaptrail_storage::StoredSnapshot;
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Colour a unified diff line by line.
///
/// `+` green, `-` red, `@@` cyan and `^` blue; other lines are unchanged.
pub fn ansi(diff: &str) -> String {
    diff.split('\n')
        .map(|line| {
            if line.starts_with("@@") {
                line.bright_cyan().to_string()
            } else if line.starts_with('+') {
                line.bright_green().to_string()
            } else if line.starts_with('-') {
                line.bright_red().to_string()
            } else if line.starts_with('^') {
                line.bright_blue().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn warning(warning: &ApplyWarning) -> String {
    match warning {
        ApplyWarning::DeletionMismatch {
            diff_line,
            expected,
            found,
        } => match found {
            Some(found) => format!(
                "diff line {diff_line}: expected to remove {expected:?}, found {found:?}; kept"
            ),
            None => format!(
                "diff line {diff_line}: expected to remove {expected:?} past end of file; skipped"
            ),
        },
        ApplyWarning::MalformedHunk { diff_line, header } => {
            format!("diff line {diff_line}: malformed hunk header {header:?}; hunk ignored")
        }
    }
}

pub fn snapshot_summary(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Source:   {}", snapshot.source_path);
    let _ = writeln!(out, "Hash:     {}", snapshot.content_hash);
    let _ = writeln!(out, "Language: {}", snapshot.language);
    let _ = writeln!(out, "Size:     {} chars", snapshot.size);
    let _ = writeln!(
        out,
        "Captured: {}",
        snapshot.captured_at.format(TIME_FORMAT)
    );
    if let Some(modified) = snapshot.source_modified_at {
        let _ = writeln!(out, "Modified: {}", modified.format(TIME_FORMAT));
    }
    if let Some(metrics) = &snapshot.metrics {
        out.push('\n');
        out.push_str(&metrics_table(metrics));
    }
    out
}

pub fn metrics_table(metrics: &CodeMetrics) -> String {
    let mut out = String::new();
    for (name, value) in metrics.to_map() {
        let _ = writeln!(out, "  {:<18} {}", name, number(value));
    }
    out
}

pub fn complexity_table(complexity: &Complexity) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<18} {}",
        "cyclomatic", complexity.cyclomatic_complexity
    );
    let _ = writeln!(out, "  {:<18} {}", "nesting_depth", complexity.nesting_depth);
    let _ = writeln!(out, "  {:<18} {}", "branch_count", complexity.branch_count);
    let _ = writeln!(
        out,
        "  {:<18} {}",
        "score",
        number(complexity.complexity_score)
    );
    out
}

pub fn smell_list(smells: &[CodeSmell]) -> String {
    if smells.is_empty() {
        return "No smells found.\n".to_string();
    }
    let mut out = String::new();
    for smell in smells {
        let label = format!("{:<8}", smell.severity.to_string());
        let severity = match smell.severity {
            Severity::High => label.red().bold(),
            Severity::Medium => label.yellow(),
            Severity::Low => label.dimmed(),
        };
        let _ = writeln!(
            out,
            "{:>5}  {} {:<15} {}",
            smell.line,
            severity,
            smell.kind.as_str(),
            smell.message
        );
    }
    out
}

/// Header, changed metrics and the diff.
pub fn report(report: &ComparisonReport, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} -> {}",
        short_hash(&report.old_snapshot.content_hash),
        short_hash(&report.new_snapshot.content_hash)
    );
    let _ = writeln!(
        out,
        "Significant: {}",
        if report.is_significant { "yes" } else { "no" }
    );
    let _ = writeln!(out, "Size change: {:+}", report.size_change);

    let changed: Vec<_> = report.changed_metrics().collect();
    if !changed.is_empty() {
        out.push_str("Metrics:\n");
        for (name, delta) in changed {
            let _ = writeln!(
                out,
                "  {:<18} {} -> {} ({:+})",
                name,
                number(delta.old),
                number(delta.new),
                delta.change
            );
        }
    }

    if report.has_changes() {
        out.push('\n');
        if color {
            out.push_str(&ansi(&report.diff));
        } else {
            out.push_str(&report.diff);
        }
    } else {
        out.push_str("No differences.\n");
    }
    out
}

pub fn history_table(records: &[StoredSnapshot]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<30} {:<20} {:<10} {:>8}  {}",
        "ID", "CAPTURED", "HASH", "SIZE", "SOURCE"
    );
    let _ = writeln!(out, "{}", "-".repeat(90));
    for record in records {
        let _ = writeln!(
            out,
            "{:<30} {:<20} {:<10} {:>8}  {}",
            record.id,
            record.captured_at.format(TIME_FORMAT),
            short_hash(&record.content_hash),
            record.size,
            record.source_path
        );
    }
    out
}

pub fn record_details(record: &StoredSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Snapshot: {}", record.id);
    let _ = writeln!(out, "Source:   {}", record.source_path);
    let _ = writeln!(out, "Hash:     {}", record.content_hash);
    let _ = writeln!(out, "Language: {}", record.language);
    let _ = writeln!(out, "Size:     {} chars", record.size);
    let _ = writeln!(out, "Captured: {}", record.captured_at.format(TIME_FORMAT));
    if let Some(parent) = &record.parent_id {
        let _ = writeln!(out, "Parent:   {parent}");
    }
    if let Some(comment) = &record.comment {
        let _ = writeln!(out, "Comment:  {comment}");
    }
    if let Some(metrics) = &record.metrics {
        out.push('\n');
        out.push_str(&metrics_table(metrics));
    }
    out
}

fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

/// Integers without a fractional part, everything else with two decimals.
fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
