//! Scan result container.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::record::DirectoryRecord;

/// Everything a scan produced, complete or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Root path that was scanned (canonicalized).
    pub root: PathBuf,

    /// Visited directories in discovery order; the root comes first.
    pub records: Vec<DirectoryRecord>,

    /// `false` when the scan was cancelled before the queue drained.
    pub completed: bool,

    /// When this scan was performed.
    pub scanned_at: SystemTime,

    /// Duration of the scan.
    pub scan_duration: Duration,

    /// Warnings encountered during scan.
    pub warnings: Vec<ScanWarning>,
}

impl ScanOutcome {
    /// Create a new outcome.
    pub fn new(
        root: PathBuf,
        records: Vec<DirectoryRecord>,
        completed: bool,
        scan_duration: Duration,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        Self {
            root,
            records,
            completed,
            scanned_at: SystemTime::now(),
            scan_duration,
            warnings,
        }
    }

    /// Look up the record for `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&DirectoryRecord> {
        let path = path.as_ref();
        self.records.iter().find(|r| r.path == path)
    }

    /// Record of the scan root.
    pub fn root_record(&self) -> Option<&DirectoryRecord> {
        self.get(&self.root)
    }

    /// Total size under the root, as of the last aggregation.
    pub fn total_size(&self) -> u64 {
        self.root_record().map_or(0, |r| r.total_size())
    }

    /// Number of visited directories.
    pub fn dir_count(&self) -> usize {
        self.records.len()
    }

    /// Check if the scan was interrupted.
    pub fn is_partial(&self) -> bool {
        !self.completed
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
