//! Line diffs: generation and replay.
//!
//! Output is unified-diff text:
//!
//! ```text
//! --- previous
//! +++ current
//! @@ -1,3 +1,3 @@
//!  Line 1
//! -Line 2
//! +Line 2 modified
//!  Line 3
//! ```
//!
//! Hunk headers always carry explicit lengths. When a side of a text diff
//! lacks a trailing newline, its last line is followed by
//! `\ No newline at end of file`; [`DiffEngine::apply`] never treats that
//! marker as content.

mod apply;
pub mod matcher;
mod unified;

pub use apply::{Applied, ApplyWarning, HunkHeader};

use crate::DiffError;
use serde::{Deserialize, Serialize};
use unified::{split_lines, Line};

/// Marker line following an unterminated last line.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// How [`DiffEngine::apply`] reacts to a diff that does not fit the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Skip mismatched deletions and malformed hunks, reporting them as warnings.
    #[default]
    Lenient,
    /// Fail on the first mismatch.
    Strict,
}

/// Diff generation and replay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Unchanged lines shown around each change.
    pub context_lines: usize,
    /// Label on the `---` line.
    pub from_label: String,
    /// Label on the `+++` line.
    pub to_label: String,
    /// Replay behaviour.
    pub apply_mode: ApplyMode,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            from_label: "previous".to_string(),
            to_label: "current".to_string(),
            apply_mode: ApplyMode::Lenient,
        }
    }
}

/// Generates and replays unified diffs.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    options: DiffOptions,
}

impl DiffEngine {
    /// Create an engine with the given options.
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// The engine's options.
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Diff two texts. Returns an empty string when they are identical.
    pub fn generate(&self, old: &str, new: &str) -> String {
        unified::render(&split_lines(old), &split_lines(new), &self.options)
    }

    /// Diff two line sequences. Lines must not contain `\n`.
    pub fn generate_lines<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> String {
        fn to_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Line<'_>> {
            lines
                .iter()
                .map(|line| Line {
                    text: line.as_ref(),
                    terminated: true,
                })
                .collect()
        }
        unified::render(&to_lines(old), &to_lines(new), &self.options)
    }

    /// Replay `diff` against `original` using the configured [`ApplyMode`].
    ///
    /// In lenient mode this never fails; check [`Applied::is_clean`] to find
    /// out whether anything was skipped.
    pub fn apply(&self, original: &str, diff: &str) -> Result<Applied, DiffError> {
        apply::apply(original, diff, self.options.apply_mode)
    }

    /// Replay `diff` with an explicit mode, ignoring the configured one.
    pub fn apply_with(
        &self,
        original: &str,
        diff: &str,
        mode: ApplyMode,
    ) -> Result<Applied, DiffError> {
        apply::apply(original, diff, mode)
    }
}
