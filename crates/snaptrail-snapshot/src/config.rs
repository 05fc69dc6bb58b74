//! Analysis configuration.

use crate::classify::SignificanceConfig;
use crate::codec::CodecConfig;
use crate::diff::DiffOptions;
use crate::smells::SmellLimits;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every tunable the snapshot engine takes, passed explicitly to
/// [`SnapshotManager::new`](crate::SnapshotManager::new).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub significance: SignificanceConfig,
    pub diff: DiffOptions,
    pub smells: SmellLimits,
    pub codec: CodecConfig,
    /// Extra or replacement `extension -> language` entries.
    pub languages: BTreeMap<String, String>,
}
