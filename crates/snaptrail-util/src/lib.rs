//! Shared utilities for snaptrail.
//!
//! - Logging setup with tracing
//! - RAII timing of operations
//! - ULID-based identifiers for stored snapshots
//! - Standard directories and path helpers

pub mod id;
pub mod log;
pub mod path;
pub mod timing;

pub use id::{IdPrefix, Identifier};
pub use log::{LogConfig, LogLevel};
pub use timing::{Stage, TimingGuard};
