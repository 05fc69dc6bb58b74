//! ULID-based identifier generation with prefixes.
//!
//! Identifiers follow the pattern `prefix_ulid`, for example
//! `snp_01hqxyz...` for a stored snapshot. Ascending identifiers sort in
//! creation order, which the history store relies on.

use ulid::Ulid;

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Snapshot,
}

impl IdPrefix {
    /// Get the string prefix for this identifier type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Snapshot => "snp",
        }
    }
}

/// Identifier generation.
pub struct Identifier;

impl Identifier {
    /// Generate a new ascending identifier (newer = larger).
    pub fn ascending(prefix: IdPrefix) -> String {
        Self::with_ulid(prefix, Ulid::new())
    }

    /// Generate an identifier with a specific ULID (for testing or imports).
    pub fn with_ulid(prefix: IdPrefix, ulid: Ulid) -> String {
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    /// Generate a snapshot ID.
    pub fn snapshot() -> String {
        Self::ascending(IdPrefix::Snapshot)
    }
}
