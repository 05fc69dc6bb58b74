//! Structural line counts.
//!
//! Every line lands in exactly one of four buckets (blank, docstring,
//! comment, code), so `total_lines` always equals their sum. Definition,
//! class and import lines are code lines that also bump their counter.
//!
//! Docstrings are tracked with a two-state machine:
//!
//! | state | line | next state |
//! |---|---|---|
//! | `Normal` | opens `"""`/`'''` and does not close it | `InDocstring(delim)` |
//! | `Normal` | opens and closes on the same line | `Normal` |
//! | `InDocstring(delim)` | ends with `delim` | `Normal` |
//! | `InDocstring(delim)` | anything else non-blank | `InDocstring(delim)` |
//!
//! Blank lines never change state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

static DEF_PATTERN: OnceLock<regex::Regex> = OnceLock::new();
static CLASS_PATTERN: OnceLock<regex::Regex> = OnceLock::new();
static IMPORT_PATTERN: OnceLock<regex::Regex> = OnceLock::new();

fn def_pattern() -> &'static regex::Regex {
    DEF_PATTERN.get_or_init(|| {
        regex::Regex::new(r"^\s*def\s+\w+\s*\(")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

fn class_pattern() -> &'static regex::Regex {
    CLASS_PATTERN.get_or_init(|| {
        regex::Regex::new(r"^\s*class\s+\w+")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

fn import_pattern() -> &'static regex::Regex {
    IMPORT_PATTERN.get_or_init(|| {
        regex::Regex::new(r"^\s*import\s+|^\s*from\s+\w+\s+import")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

const COMMENT_MARKER: char = '#';
const DOC_DELIMITERS: [&str; 2] = ["\"\"\"", "'''"];

/// Line counts for one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub docstring_lines: usize,
    pub function_count: usize,
    pub class_count: usize,
    pub import_count: usize,
    pub todo_count: usize,
    pub max_line_length: usize,
    /// Mean raw line length in characters, rounded to 2 decimals.
    pub avg_line_length: f64,
    /// `(comment_lines + docstring_lines) / total_lines * 100`, rounded to 2 decimals.
    pub comment_ratio: f64,
}

impl CodeMetrics {
    /// Metric name to value, in name order.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("total_lines", self.total_lines as f64),
            ("code_lines", self.code_lines as f64),
            ("comment_lines", self.comment_lines as f64),
            ("blank_lines", self.blank_lines as f64),
            ("docstring_lines", self.docstring_lines as f64),
            ("function_count", self.function_count as f64),
            ("class_count", self.class_count as f64),
            ("import_count", self.import_count as f64),
            ("todo_count", self.todo_count as f64),
            ("max_line_length", self.max_line_length as f64),
            ("avg_line_length", self.avg_line_length),
            ("comment_ratio", self.comment_ratio),
        ])
    }
}

/// Docstring scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocState {
    Normal,
    InDocstring(&'static str),
}

/// How a single non-blank line was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Docstring,
    Comment { todo: bool },
    Function,
    Class,
    Import,
    Code,
}

impl DocState {
    /// Classify `line` and return the state for the next line.
    pub fn step(self, line: &str) -> (LineKind, DocState) {
        let stripped = line.trim();
        if stripped.is_empty() {
            return (LineKind::Blank, self);
        }

        if let DocState::InDocstring(delim) = self {
            let next = if stripped.ends_with(delim) {
                DocState::Normal
            } else {
                self
            };
            return (LineKind::Docstring, next);
        }

        if let Some(delim) = DOC_DELIMITERS.into_iter().find(|d| stripped.starts_with(d)) {
            let closes = stripped.len() > delim.len() && stripped.ends_with(delim);
            let next = if closes {
                DocState::Normal
            } else {
                DocState::InDocstring(delim)
            };
            return (LineKind::Docstring, next);
        }

        let kind = if stripped.starts_with(COMMENT_MARKER) {
            LineKind::Comment {
                todo: stripped.to_uppercase().contains("TODO"),
            }
        } else if def_pattern().is_match(line) {
            LineKind::Function
        } else if class_pattern().is_match(line) {
            LineKind::Class
        } else if import_pattern().is_match(line) {
            LineKind::Import
        } else {
            LineKind::Code
        };
        (kind, DocState::Normal)
    }
}

/// Count the structural metrics of `content`.
pub fn analyze(content: &str) -> CodeMetrics {
    let mut metrics = CodeMetrics::default();
    let mut state = DocState::Normal;
    let mut total_length = 0usize;

    for line in content.lines() {
        let length = line.chars().count();
        metrics.total_lines += 1;
        metrics.max_line_length = metrics.max_line_length.max(length);
        total_length += length;

        let (kind, next) = state.step(line);
        state = next;
        match kind {
            LineKind::Blank => metrics.blank_lines += 1,
            LineKind::Docstring => metrics.docstring_lines += 1,
            LineKind::Comment { todo } => {
                metrics.comment_lines += 1;
                if todo {
                    metrics.todo_count += 1;
                }
            }
            LineKind::Function => metrics.function_count += 1,
            LineKind::Class => metrics.class_count += 1,
            LineKind::Import => metrics.import_count += 1,
            LineKind::Code => {}
        }
    }

    let total = metrics.total_lines;
    metrics.code_lines =
        total - metrics.blank_lines - metrics.comment_lines - metrics.docstring_lines;
    if total > 0 {
        metrics.avg_line_length = round2(total_length as f64 / total as f64);
        metrics.comment_ratio = round2(
            (metrics.comment_lines + metrics.docstring_lines) as f64 / total as f64 * 100.0,
        );
    }
    metrics
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
