//! Configuration for the snaptrail CLI.
//!
//! Configuration is loaded from multiple sources and merged:
//! 1. Global config: `~/.config/snaptrail/config.json`
//! 2. Environment variable: `SNAPTRAIL_CONFIG_CONTENT`
//! 3. Project config: `snaptrail.jsonc` or `snaptrail.json` in the working directory
//!
//! Files are JSONC: `//` and `/* */` comments are allowed.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use snaptrail_snapshot::{AnalysisConfig, ApplyMode};
use snaptrail_storage::StoreSettings;
use snaptrail_util::LogLevel;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable holding inline JSONC configuration.
pub const CONFIG_CONTENT_ENV: &str = "SNAPTRAIL_CONFIG_CONTENT";

/// Merged CLI configuration. Every field is optional so that partial files
/// override only what they mention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    /// Also append logs to `snaptrail.log` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<bool>,

    /// Where `track` and `history` keep snapshots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub significance: Option<SignificanceSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub smells: Option<SmellSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<CodecSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<HistorySection>,

    /// Extension to language name, e.g. `"rs": "Rust"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_mode: Option<ApplyMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmellSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_line_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_function_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nesting_indent: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic_number_digits: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_short_name: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_snapshots_per_file: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_change_threshold: Option<f64>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Loading order (later sources override earlier):
    /// 1. Global config from `~/.config/snaptrail/`
    /// 2. `SNAPTRAIL_CONFIG_CONTENT` environment variable
    /// 3. Project config from `project_dir`
    pub async fn load(project_dir: Option<&Path>) -> anyhow::Result<(Self, Vec<PathBuf>)> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        if let Some(global_dir) = Self::global_config_dir() {
            for name in &["config.json", "config.jsonc", "snaptrail.json", "snaptrail.jsonc"] {
                let path = global_dir.join(name);
                if path.exists() {
                    config = config.merge(Self::load_file(&path).await?);
                    sources.push(path);
                    break;
                }
            }
        }

        if let Ok(content) = std::env::var(CONFIG_CONTENT_ENV) {
            config = config.merge(Self::parse_jsonc(&content, "<env>")?);
        }

        if let Some(dir) = project_dir {
            for name in &["snaptrail.jsonc", "snaptrail.json"] {
                let path = dir.join(name);
                if path.exists() {
                    config = config.merge(Self::load_file(&path).await?);
                    sources.push(path);
                    break;
                }
            }
        }

        Ok((config, sources))
    }

    /// Get the global config directory.
    ///
    /// On Unix, `~/.config/snaptrail` wins when it exists.
    pub fn global_config_dir() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            if let Some(home) = dirs::home_dir() {
                let xdg_config = home.join(".config").join("snaptrail");
                if xdg_config.exists() {
                    return Some(xdg_config);
                }
            }
        }

        snaptrail_util::path::config_dir()
    }

    /// Load configuration from a file.
    pub async fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse_jsonc(&content, &path.display().to_string())
    }

    /// Parse JSONC (JSON with comments).
    pub fn parse_jsonc(content: &str, source: &str) -> anyhow::Result<Self> {
        let stripped = strip_comments(content);
        serde_json::from_str(&stripped).with_context(|| format!("Invalid config in {source}"))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(mut self, other: Self) -> Self {
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file;
        }
        if other.store_dir.is_some() {
            self.store_dir = other.store_dir;
        }

        self.significance = merge_section(self.significance, other.significance, |b, o| {
            SignificanceSection {
                threshold: o.threshold.or(b.threshold),
            }
        });
        self.diff = merge_section(self.diff, other.diff, |b, o| DiffSection {
            context_lines: o.context_lines.or(b.context_lines),
            from_label: o.from_label.or(b.from_label),
            to_label: o.to_label.or(b.to_label),
            apply_mode: o.apply_mode.or(b.apply_mode),
        });
        self.smells = merge_section(self.smells, other.smells, |b, o| SmellSection {
            max_line_length: o.max_line_length.or(b.max_line_length),
            max_function_lines: o.max_function_lines.or(b.max_function_lines),
            nesting_indent: o.nesting_indent.or(b.nesting_indent),
            indent_width: o.indent_width.or(b.indent_width),
            magic_number_digits: o.magic_number_digits.or(b.magic_number_digits),
            max_short_name: o.max_short_name.or(b.max_short_name),
        });
        self.codec = merge_section(self.codec, other.codec, |b, o| CodecSection {
            compression_level: o.compression_level.or(b.compression_level),
        });
        self.history = merge_section(self.history, other.history, |b, o| HistorySection {
            max_snapshots_per_file: o.max_snapshots_per_file.or(b.max_snapshots_per_file),
            min_change_threshold: o.min_change_threshold.or(b.min_change_threshold),
        });

        self.languages = match (self.languages, other.languages) {
            (Some(mut b), Some(o)) => {
                b.extend(o);
                Some(b)
            }
            (b, None) => b,
            (None, o) => o,
        };

        self
    }

    /// Engine settings with configured values laid over the defaults.
    pub fn analysis(&self) -> AnalysisConfig {
        let mut analysis = AnalysisConfig::default();

        if let Some(threshold) = self.significance.as_ref().and_then(|s| s.threshold) {
            analysis.significance.threshold = threshold;
        }
        if let Some(diff) = &self.diff {
            let target = &mut analysis.diff;
            set(&mut target.context_lines, diff.context_lines);
            set(&mut target.from_label, diff.from_label.clone());
            set(&mut target.to_label, diff.to_label.clone());
            set(&mut target.apply_mode, diff.apply_mode);
        }
        if let Some(smells) = &self.smells {
            let target = &mut analysis.smells;
            set(&mut target.max_line_length, smells.max_line_length);
            set(&mut target.max_function_lines, smells.max_function_lines);
            set(&mut target.nesting_indent, smells.nesting_indent);
            set(&mut target.indent_width, smells.indent_width);
            set(&mut target.magic_number_digits, smells.magic_number_digits);
            set(&mut target.max_short_name, smells.max_short_name);
        }
        if let Some(level) = self.codec.as_ref().and_then(|c| c.compression_level) {
            analysis.codec.compression_level = level.min(9);
        }
        if let Some(languages) = &self.languages {
            analysis.languages = languages.clone();
        }

        analysis
    }

    /// History settings with configured values laid over the defaults.
    pub fn store_settings(&self) -> StoreSettings {
        let mut settings = StoreSettings::default();
        if let Some(history) = &self.history {
            set(
                &mut settings.max_snapshots_per_file,
                history.max_snapshots_per_file,
            );
            set(
                &mut settings.min_change_threshold,
                history.min_change_threshold,
            );
        }
        settings
    }

    /// Configured store directory, or the default history directory.
    pub fn resolved_store_dir(&self) -> Option<PathBuf> {
        self.store_dir
            .clone()
            .or_else(snaptrail_util::path::history_dir)
    }

    /// Log file path when file logging is enabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        if self.log_file.unwrap_or(false) {
            snaptrail_util::log::default_log_path()
        } else {
            None
        }
    }

    /// Configured log level; `warn` keeps normal runs quiet.
    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or(LogLevel::Warn)
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn merge_section<T>(base: Option<T>, other: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, other) {
        (Some(b), Some(o)) => Some(merge(b, o)),
        (b, None) => b,
        (None, o) => o,
    }
}

/// Strip `//` and `/* */` comments outside of string literals.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            result.push(c);
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    // Keep line numbers stable for parse errors
                    if c == '\n' {
                        result.push('\n');
                    }
                    prev = c;
                }
            }
            _ => result.push(c),
        }
    }

    result
}
