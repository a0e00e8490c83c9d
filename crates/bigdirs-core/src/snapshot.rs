//! Persisted sizes from a previous run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::DirectoryRecord;

/// One directory's total size at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Directory sizes recorded by an earlier scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Root of the scan that produced it.
    #[serde(default)]
    pub root: PathBuf,
    /// Total size per directory.
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Capture the total sizes of `records`, skipping duplicates.
    pub fn from_records(
        root: impl Into<PathBuf>,
        records: &[DirectoryRecord],
        timestamp: DateTime<Utc>,
    ) -> Self {
        let entries = records
            .iter()
            .filter(|r| !r.status.is_duplicate())
            .map(|r| SnapshotEntry {
                path: r.path.clone(),
                size: r.total_size(),
            })
            .collect();
        Self {
            timestamp,
            root: root.into(),
            entries,
        }
    }

    /// Index entries by path.
    pub fn sizes(&self) -> HashMap<&Path, u64> {
        self.entries
            .iter()
            .map(|e| (e.path.as_path(), e.size))
            .collect()
    }

    /// Check if this snapshot can be compared with a scan of `root`. Older
    /// snapshots without a recorded root are accepted.
    pub fn is_for(&self, root: &Path) -> bool {
        self.root.as_os_str().is_empty() || self.root == root
    }

    /// Number of recorded directories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no directories were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
