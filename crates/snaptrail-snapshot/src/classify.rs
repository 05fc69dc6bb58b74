//! Significant-change classification.

use crate::diff::matcher::SequenceMatcher;
use serde::{Deserialize, Serialize};

/// Significance threshold configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// A change is significant when `1 - similarity` exceeds this value.
    pub threshold: f64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self { threshold: 0.05 }
    }
}

/// Decides whether two versions of a text differ significantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeClassifier {
    config: SignificanceConfig,
}

impl ChangeClassifier {
    pub fn new(config: SignificanceConfig) -> Self {
        Self { config }
    }

    /// Classifier with an explicit threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self::new(SignificanceConfig { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Character similarity in `[0, 1]`.
    pub fn similarity(old: &str, new: &str) -> f64 {
        let a: Vec<char> = old.chars().collect();
        let b: Vec<char> = new.chars().collect();
        SequenceMatcher::new(&a, &b).ratio()
    }

    /// `1 - similarity`, or `None` when either side is empty.
    pub fn change_ratio(old: &str, new: &str) -> Option<f64> {
        if old.is_empty() || new.is_empty() {
            return None;
        }
        Some(1.0 - Self::similarity(old, new))
    }

    /// Whether the change from `old` to `new` exceeds the threshold.
    ///
    /// An empty side is always significant.
    pub fn is_significant(&self, old: &str, new: &str) -> bool {
        match Self::change_ratio(old, new) {
            Some(ratio) => ratio > self.config.threshold,
            None => true,
        }
    }
}

/// [`ChangeClassifier::is_significant`] with an explicit threshold.
pub fn is_significant(old: &str, new: &str, threshold: f64) -> bool {
    ChangeClassifier::with_threshold(threshold).is_significant(old, new)
}
