//! Branch-count complexity estimate.

use crate::metrics::round2;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static BRANCH_KEYWORDS: OnceLock<Vec<regex::Regex>> = OnceLock::new();

fn branch_keywords() -> &'static [regex::Regex] {
    BRANCH_KEYWORDS.get_or_init(|| {
        ["if", "elif", "for", "while", "except", "case"]
            .iter()
            .map(|kw| {
                regex::Regex::new(&format!(r"\b{kw}\b"))
                    .expect("Invalid regex pattern - this is a compile-time constant")
            })
            .collect()
    })
}

/// Complexity figures for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Complexity {
    /// `branch_count + 1`, or 0 for empty input.
    pub cyclomatic_complexity: usize,
    /// Deepest indentation level reached, counting distinct indent widths.
    pub nesting_depth: usize,
    pub branch_count: usize,
    /// `cyclomatic * 0.7 + depth * 0.3`, rounded to 2 decimals.
    pub complexity_score: f64,
}

/// Estimate the complexity of `content`.
///
/// Each branch keyword found on a line counts once; `def`/`class` lines are
/// never counted. Blank and `#` comment lines are skipped.
pub fn analyze(content: &str) -> Complexity {
    if content.is_empty() {
        return Complexity::default();
    }

    let mut branch_count = 0usize;
    let mut max_depth = 0usize;
    let mut indents: Vec<usize> = vec![0];

    for line in content.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        let top = indents.last().copied().unwrap_or(0);
        if indent > top {
            indents.push(indent);
        } else if indent < top {
            while indents.last().is_some_and(|&level| indent < level) {
                indents.pop();
            }
            // Dedent that lands between two known levels opens a new one.
            if indents.last() != Some(&indent) {
                indents.push(indent);
            }
        }
        max_depth = max_depth.max(indents.len().saturating_sub(1));

        if stripped.starts_with("def ") || stripped.starts_with("class ") {
            continue;
        }
        branch_count += branch_keywords()
            .iter()
            .filter(|kw| kw.is_match(stripped))
            .count();
    }

    let cyclomatic_complexity = branch_count + 1;
    Complexity {
        cyclomatic_complexity,
        nesting_depth: max_depth,
        branch_count,
        complexity_score: round2(cyclomatic_complexity as f64 * 0.7 + max_depth as f64 * 0.3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(analyze(""), Complexity::default());
    }

    #[test]
    fn straight_line_code_has_complexity_one() {
        let c = analyze("x = 1\ny = 2\n");
        assert_eq!(c.cyclomatic_complexity, 1);
        assert_eq!(c.nesting_depth, 0);
        assert_eq!(c.complexity_score, 0.7);
    }

    #[test]
    fn counts_branches_and_nesting() {
        let src = "\
def check(items):
    for item in items:
        if item:
            print(item)
        elif item is None:
            pass
    while False:
        pass
";
        let c = analyze(src);
        assert_eq!(c.branch_count, 4);
        assert_eq!(c.cyclomatic_complexity, 5);
        assert_eq!(c.nesting_depth, 3);
        assert_eq!(c.complexity_score, round2(5.0 * 0.7 + 3.0 * 0.3));
    }

    #[test]
    fn definition_lines_and_comments_are_not_branches() {
        let c = analyze("def if_ready():\n    # if this then that\n    return 1\n");
        assert_eq!(c.branch_count, 0);
    }

    #[test]
    fn multiple_keywords_on_one_line_each_count() {
        let c = analyze("x = [a for a in b if a]\n");
        assert_eq!(c.branch_count, 2);
    }

    #[test]
    fn dedent_between_levels_opens_new_level() {
        let c = analyze("a\n        b\n    c\n");
        assert_eq!(c.nesting_depth, 1);
    }
}
