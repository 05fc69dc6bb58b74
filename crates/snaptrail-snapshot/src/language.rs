//! Language detection from file extensions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Language tag derived from a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Language {
    /// A language known to the lookup table, stored by display name.
    Known(String),
    Unknown,
}

impl Language {
    pub const UNKNOWN_NAME: &'static str = "Unknown";

    pub fn name(&self) -> &str {
        match self {
            Self::Known(name) => name,
            Self::Unknown => Self::UNKNOWN_NAME,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.name().to_string()
    }
}

impl From<String> for Language {
    fn from(name: String) -> Self {
        if name.is_empty() || name.eq_ignore_ascii_case(Self::UNKNOWN_NAME) {
            Self::Unknown
        } else {
            Self::Known(name)
        }
    }
}

const BUILTIN: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("java", "Java"),
    ("c", "C"),
    ("cpp", "C++"),
    ("h", "C/C++ Header"),
    ("cs", "C#"),
    ("go", "Go"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("ts", "TypeScript"),
    ("jsx", "React JSX"),
    ("tsx", "React TSX"),
    ("md", "Markdown"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("sql", "SQL"),
    ("sh", "Shell"),
    ("bat", "Batch"),
    ("ps1", "PowerShell"),
];

/// Extension to language lookup.
///
/// Keys are lowercase extensions without the leading dot. Overrides replace
/// or extend the built-in entries.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    by_extension: HashMap<String, String>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            by_extension: BUILTIN
                .iter()
                .map(|(ext, name)| (ext.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl LanguageTable {
    /// Built-in table with `overrides` applied on top.
    ///
    /// Override keys may be written with or without a leading dot.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut table = Self::default();
        for (ext, name) in overrides {
            table.insert(ext, name);
        }
        table
    }

    pub fn insert(&mut self, extension: &str, name: &str) {
        self.by_extension
            .insert(normalize_extension(extension), name.to_string());
    }

    /// Detect the language of `path` from its extension.
    pub fn detect(&self, path: &Path) -> Language {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_extension.get(&normalize_extension(ext)))
            .map(|name| Language::Known(name.clone()))
            .unwrap_or(Language::Unknown)
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}
