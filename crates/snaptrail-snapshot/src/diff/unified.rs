//! Unified diff generation.

use super::matcher::{SequenceMatcher, Tag};
use super::{DiffOptions, NO_NEWLINE_MARKER};

/// A line together with whether it was terminated by `\n`.
///
/// Only the final line of a text can be unterminated, and it never compares
/// equal to a terminated line with the same text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Line<'a> {
    pub text: &'a str,
    pub terminated: bool,
}

/// Split text into lines, keeping `\r` as part of the line text.
pub(crate) fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.split_inclusive('\n')
        .map(|piece| match piece.strip_suffix('\n') {
            Some(text) => Line {
                text,
                terminated: true,
            },
            None => Line {
                text: piece,
                terminated: false,
            },
        })
        .collect()
}

/// Format one side of a hunk header range.
///
/// Empty ranges point at the line before the range, so an insertion at the top
/// of a file reads `0,0`.
fn format_range(start: usize, end: usize) -> String {
    let len = end - start;
    let first = if len == 0 { start } else { start + 1 };
    format!("{first},{len}")
}

/// Render the unified diff between two line sequences.
pub(crate) fn render(old: &[Line<'_>], new: &[Line<'_>], options: &DiffOptions) -> String {
    let matcher = SequenceMatcher::new(old, new);
    let groups = matcher.grouped_opcodes(options.context_lines);
    if groups.is_empty() {
        return String::new();
    }

    let mut out: Vec<String> = vec![
        format!("--- {}", options.from_label),
        format!("+++ {}", options.to_label),
    ];

    for group in &groups {
        let (first, last) = match (group.first(), group.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(first.a_start, last.a_end),
            format_range(first.b_start, last.b_end)
        ));

        for op in group {
            match op.tag {
                Tag::Equal => {
                    for line in &old[op.a_start..op.a_end] {
                        push_line(&mut out, ' ', line);
                    }
                }
                Tag::Delete => {
                    for line in &old[op.a_start..op.a_end] {
                        push_line(&mut out, '-', line);
                    }
                }
                Tag::Insert => {
                    for line in &new[op.b_start..op.b_end] {
                        push_line(&mut out, '+', line);
                    }
                }
                Tag::Replace => {
                    for line in &old[op.a_start..op.a_end] {
                        push_line(&mut out, '-', line);
                    }
                    for line in &new[op.b_start..op.b_end] {
                        push_line(&mut out, '+', line);
                    }
                }
            }
        }
    }

    out.join("\n")
}

fn push_line(out: &mut Vec<String>, prefix: char, line: &Line<'_>) {
    out.push(format!("{prefix}{}", line.text));
    if !line.terminated {
        out.push(NO_NEWLINE_MARKER.to_string());
    }
}
