//! Heuristic code smell detection.
//!
//! Each check is an independent pass, so one line can carry several smells.
//! Blank and comment lines are ignored by every check except `short_name`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static DEF_NAME: OnceLock<regex::Regex> = OnceLock::new();
static CLASS_NAME: OnceLock<regex::Regex> = OnceLock::new();
static GLOBAL: OnceLock<regex::Regex> = OnceLock::new();

fn def_name() -> &'static regex::Regex {
    DEF_NAME.get_or_init(|| {
        regex::Regex::new(r"^\s*def\s+(\w+)\s*\(")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

fn class_name() -> &'static regex::Regex {
    CLASS_NAME.get_or_init(|| {
        regex::Regex::new(r"^\s*class\s+(\w+)\s*[:\(]")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

fn global_keyword() -> &'static regex::Regex {
    GLOBAL.get_or_init(|| {
        regex::Regex::new(r"\bglobal\b")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Kind of smell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmellKind {
    LongLine,
    LongFunction,
    DeepNesting,
    MagicNumber,
    GlobalVariable,
    ShortName,
}

impl SmellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LongLine => "long_line",
            Self::LongFunction => "long_function",
            Self::DeepNesting => "deep_nesting",
            Self::MagicNumber => "magic_number",
            Self::GlobalVariable => "global_variable",
            Self::ShortName => "short_name",
        }
    }
}

impl fmt::Display for SmellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSmell {
    #[serde(rename = "type")]
    pub kind: SmellKind,
    /// 1-based line number.
    pub line: usize,
    pub message: String,
    pub severity: Severity,
}

impl CodeSmell {
    fn new(kind: SmellKind, line: usize, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
            severity,
        }
    }
}

/// Detector thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmellLimits {
    /// Lines longer than this many characters are `long_line`.
    pub max_line_length: usize,
    /// Functions with more body lines than this are `long_function`.
    pub max_function_lines: usize,
    /// Leading whitespace of at least this many characters is `deep_nesting`.
    pub nesting_indent: usize,
    /// Characters per nesting level, used in the `deep_nesting` message.
    pub indent_width: usize,
    /// Minimum digits for an integer literal to count as a magic number.
    pub magic_number_digits: usize,
    /// Function and class names up to this length are `short_name`.
    pub max_short_name: usize,
}

impl Default for SmellLimits {
    fn default() -> Self {
        Self {
            max_line_length: 100,
            max_function_lines: 50,
            nesting_indent: 16,
            indent_width: 4,
            magic_number_digits: 3,
            max_short_name: 2,
        }
    }
}

/// Runs every smell check with the given limits.
#[derive(Debug, Clone)]
pub struct SmellDetector {
    limits: SmellLimits,
    magic_number: Option<regex::Regex>,
}

struct OpenFunction {
    name: String,
    line: usize,
    body_lines: usize,
}

impl Default for SmellDetector {
    fn default() -> Self {
        Self::new(SmellLimits::default())
    }
}

impl SmellDetector {
    pub fn new(limits: SmellLimits) -> Self {
        let digits = limits.magic_number_digits.max(1);
        // A digit run not touching a word character on either side.
        let magic_number = regex::Regex::new(&format!(r"(?:^|\W)\d{{{digits},}}(?:\W|$)")).ok();
        Self {
            limits,
            magic_number,
        }
    }

    pub fn limits(&self) -> &SmellLimits {
        &self.limits
    }

    fn magic_number_matches(&self, line: &str) -> bool {
        self.magic_number
            .as_ref()
            .is_some_and(|re| re.is_match(line))
    }

    /// Detect smells in `content`, ordered by line.
    pub fn detect(&self, content: &str) -> Vec<CodeSmell> {
        let limits = &self.limits;
        let lines: Vec<&str> = content.lines().collect();
        let mut smells = Vec::new();
        let mut current: Option<OpenFunction> = None;

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let stripped = line.trim();
            if stripped.is_empty() || stripped.starts_with('#') {
                continue;
            }

            let length = line.chars().count();
            if length > limits.max_line_length {
                smells.push(CodeSmell::new(
                    SmellKind::LongLine,
                    line_no,
                    format!("Line too long ({length} characters)"),
                    Severity::Low,
                ));
            }

            if global_keyword().is_match(line) {
                smells.push(CodeSmell::new(
                    SmellKind::GlobalVariable,
                    line_no,
                    "Global variable used",
                    Severity::Medium,
                ));
            }

            if let Some(caps) = def_name().captures(line) {
                if let Some(done) = current.take() {
                    self.close_function(done, &mut smells);
                }
                current = Some(OpenFunction {
                    name: caps[1].to_string(),
                    line: line_no,
                    body_lines: 0,
                });
            } else if let Some(open) = current.as_mut() {
                open.body_lines += 1;
            }

            let indent = line.chars().take_while(|c| c.is_whitespace()).count();
            if indent >= limits.nesting_indent {
                let levels = indent / limits.indent_width.max(1);
                smells.push(CodeSmell::new(
                    SmellKind::DeepNesting,
                    line_no,
                    format!("Nesting too deep ({levels} levels)"),
                    Severity::Medium,
                ));
            }

            if self.magic_number_matches(line) {
                smells.push(CodeSmell::new(
                    SmellKind::MagicNumber,
                    line_no,
                    "Magic number used",
                    Severity::Low,
                ));
            }
        }
        if let Some(done) = current.take() {
            self.close_function(done, &mut smells);
        }

        for (idx, line) in lines.iter().enumerate() {
            if let Some(name) = short_name(def_name(), line, limits.max_short_name) {
                smells.push(CodeSmell::new(
                    SmellKind::ShortName,
                    idx + 1,
                    format!("Function name too short: {name}"),
                    Severity::Low,
                ));
            }
            if let Some(name) = short_name(class_name(), line, limits.max_short_name) {
                smells.push(CodeSmell::new(
                    SmellKind::ShortName,
                    idx + 1,
                    format!("Class name too short: {name}"),
                    Severity::Low,
                ));
            }
        }

        // Stable, so same-line smells keep check order.
        smells.sort_by_key(|smell| smell.line);
        smells
    }

    fn close_function(&self, function: OpenFunction, smells: &mut Vec<CodeSmell>) {
        if function.body_lines > self.limits.max_function_lines {
            smells.push(CodeSmell::new(
                SmellKind::LongFunction,
                function.line,
                format!(
                    "Function {} is too long ({} lines)",
                    function.name, function.body_lines
                ),
                Severity::Medium,
            ));
        }
    }
}

fn short_name<'a>(pattern: &regex::Regex, line: &'a str, max_len: usize) -> Option<&'a str> {
    let name = pattern.captures(line)?.get(1)?.as_str();
    (name.chars().count() <= max_len).then_some(name)
}

/// Detect smells with the default limits.
pub fn detect(content: &str) -> Vec<CodeSmell> {
    SmellDetector::default().detect(content)
}
