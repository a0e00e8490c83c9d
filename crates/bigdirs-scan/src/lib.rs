//! Directory size scanning engine for bigdirs.
//!
//! The scanner walks a tree breadth-first, one directory at a time, and
//! produces one [`DirectoryRecord`] per directory it reached. Each record
//! carries only the directory's *own* file bytes; rolling sizes up the tree
//! is left to `bigdirs-analyze`.
//!
//! # Overview
//!
//! - **Breadth-first** so an interrupted scan still has complete upper levels
//! - **Exclusions** by path prefix, glob, network mount and builtin names
//! - **Identity tracking** so hard-linked or bind-mounted directories count once
//! - **Slow directory cutoff** keeping the bytes read before giving up
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use bigdirs_scan::{ScanConfig, Scanner};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let outcome = Scanner::new()
//!     .scan(&config, &CancellationToken::new())
//!     .unwrap();
//!
//! println!("Directories: {}", outcome.dir_count());
//! println!("Completed: {}", outcome.completed);
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use bigdirs_scan::{ProgressReporter, Scanner};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> std::io::Result<()> {
//! let scanner = Scanner::new();
//! let reporter = ProgressReporter::new(scanner.subscribe(), CancellationToken::new());
//! let task = tokio::spawn(reporter.run(std::io::stderr()));
//! // ... run the scan on a blocking thread, then drop the scanner ...
//! drop(scanner);
//! task.await.ok();
//! # Ok(())
//! # }
//! ```

mod classify;
mod exclude;
mod identity;
mod mounts;
mod progress;
mod reader;
mod reporter;
mod scanner;

pub use classify::{classify, classify_extension};
pub use exclude::{BUILTIN_EXCLUDED_NAMES, ExclusionMatch, ExclusionPolicy};
pub use identity::{IdentityProber, IdentityTracker, MetadataProber, NoIdentity, Probe};
pub use mounts::{MountClassifier, ProcMounts, is_network_fs, parse_mounts};
pub use progress::ScanProgress;
pub use reader::{DirEntryInfo, DirReader, EntryKind, LocalEntries, LocalFs};
pub use reporter::{DEFAULT_RENDER_INTERVAL, ProgressReporter};
pub use scanner::{PROGRESS_CHANNEL_SIZE, Scanner};

// Re-export core types for convenience
pub use bigdirs_core::{
    ContentCategory, DirStats, DirStatus, DirectoryRecord, IdentityKey, ScanConfig, ScanError,
    ScanOutcome, ScanWarning, SkipReason, WarningKind,
};
