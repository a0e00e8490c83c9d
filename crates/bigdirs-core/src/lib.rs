//! Core types for bigdirs.
//!
//! This crate provides the data model shared by the scanning engine and the
//! analysis passes: per-directory records, content categories, scan
//! configuration, snapshots of previous runs and the error types.

mod category;
mod config;
mod error;
mod outcome;
mod record;
mod snapshot;

pub use category::{ContentCategory, TypeHistogram};
pub use config::{DEFAULT_SLOW_THRESHOLD, ScanConfig, ScanConfigBuilder};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use outcome::ScanOutcome;
pub use record::{DirStats, DirStatus, DirectoryRecord, IdentityKey, SkipReason};
pub use snapshot::{Snapshot, SnapshotEntry};
