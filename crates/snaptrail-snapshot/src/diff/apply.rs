//! Replaying a unified diff against its original text.

use super::unified::split_lines;
use super::ApplyMode;
use crate::DiffError;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

static HUNK_HEADER: OnceLock<regex::Regex> = OnceLock::new();

fn hunk_header() -> &'static regex::Regex {
    HUNK_HEADER.get_or_init(|| {
        regex::Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Something `apply` had to skip while reconstructing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApplyWarning {
    /// A removed line did not match the line under the cursor and was left in place.
    DeletionMismatch {
        /// 1-based line of the diff text.
        diff_line: usize,
        expected: String,
        found: Option<String>,
    },
    /// A hunk header could not be parsed; lines up to the next header were ignored.
    MalformedHunk { diff_line: usize, header: String },
}

/// Result of replaying a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Reconstructed text.
    pub content: String,
    /// Everything that was skipped. Empty means the diff applied cleanly.
    pub warnings: Vec<ApplyWarning>,
}

impl Applied {
    /// Whether the reconstruction may be incomplete.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Parsed `@@ -a,b +c,d @@` header. Omitted lengths default to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
}

impl HunkHeader {
    /// Parse a hunk header line; trailing section text after `@@` is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = hunk_header().captures(line)?;
        let number = |idx: usize, default: usize| -> Option<usize> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(default),
            }
        };
        Some(Self {
            old_start: number(1, 0)?,
            old_len: number(2, 1)?,
            new_start: number(3, 0)?,
            new_len: number(4, 1)?,
        })
    }

    /// 0-based index into the new text where this hunk begins.
    fn cursor(&self) -> usize {
        if self.new_len == 0 {
            self.new_start
        } else {
            self.new_start.saturating_sub(1)
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LastLine {
    Added,
    Removed,
    Context,
}

/// Replay `diff` against `original`.
pub(crate) fn apply(original: &str, diff: &str, mode: ApplyMode) -> Result<Applied, DiffError> {
    let mut lines: Vec<String> = split_lines(original)
        .into_iter()
        .map(|line| line.text.to_string())
        .collect();
    let mut missing_newline = !original.is_empty() && !original.ends_with('\n');
    let mut warnings = Vec::new();

    let mut cursor = 0usize;
    let mut seen_hunk = false;
    let mut skipping = false;
    let mut last: Option<LastLine> = None;

    let diff_lines = diff
        .split_inclusive('\n')
        .map(|line| line.strip_suffix('\n').unwrap_or(line));

    for (idx, diff_line) in diff_lines.enumerate() {
        let diff_line_no = idx + 1;

        if diff_line.starts_with("@@") {
            seen_hunk = true;
            last = None;
            match HunkHeader::parse(diff_line) {
                Some(header) => {
                    cursor = header.cursor();
                    skipping = false;
                }
                None => {
                    if mode == ApplyMode::Strict {
                        return Err(DiffError::MalformedHeader(diff_line.to_string()));
                    }
                    warn!(line = diff_line_no, header = %diff_line, "Skipping malformed hunk");
                    warnings.push(ApplyWarning::MalformedHunk {
                        diff_line: diff_line_no,
                        header: diff_line.to_string(),
                    });
                    skipping = true;
                }
            }
            continue;
        }

        // File headers before the first hunk.
        if !seen_hunk {
            continue;
        }
        if skipping {
            continue;
        }

        // `\ No newline at end of file` refers to the line before it.
        if diff_line.starts_with('\\') {
            match last {
                Some(LastLine::Removed) => missing_newline = false,
                Some(LastLine::Added) | Some(LastLine::Context) => missing_newline = true,
                None => {}
            }
            continue;
        }

        if let Some(added) = diff_line.strip_prefix('+') {
            let at = cursor.min(lines.len());
            lines.insert(at, added.to_string());
            cursor = at + 1;
            last = Some(LastLine::Added);
        } else if let Some(removed) = diff_line.strip_prefix('-') {
            let found = lines.get(cursor);
            if found.is_some_and(|line| line == removed) {
                lines.remove(cursor);
            } else {
                let found = found.cloned();
                if mode == ApplyMode::Strict {
                    return Err(DiffError::Mismatch {
                        line: diff_line_no,
                        expected: removed.to_string(),
                        found,
                    });
                }
                warn!(
                    line = diff_line_no,
                    expected = %removed,
                    "Removed line does not match original; skipping deletion"
                );
                warnings.push(ApplyWarning::DeletionMismatch {
                    diff_line: diff_line_no,
                    expected: removed.to_string(),
                    found,
                });
            }
            last = Some(LastLine::Removed);
        } else {
            cursor += 1;
            last = Some(LastLine::Context);
        }
    }

    let mut content = lines.join("\n");
    if !lines.is_empty() && !missing_newline {
        content.push('\n');
    }

    Ok(Applied { content, warnings })
}
