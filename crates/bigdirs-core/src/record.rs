//! Per-directory scan records.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::category::{ContentCategory, TypeHistogram};

/// Device and inode pair identifying a physical directory.
///
/// Two paths with the same key are the same directory reached twice, via a
/// bind mount or a directory hard link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Device ID.
    pub device: u64,
    /// Inode number.
    pub inode: u64,
}

impl IdentityKey {
    /// Create a new identity key.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }
}

/// Why a directory was not fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Matched an exclusion rule; never opened.
    Excluded,
    /// Listing the directory failed.
    ReadFailed,
    /// Listing exceeded the slow threshold; sizes are a lower bound.
    Slow,
}

/// Terminal classification of a visited directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirStatus {
    /// Every entry was read.
    Scanned,
    /// Not entered, or abandoned part way. Children were never enqueued.
    Skipped(SkipReason),
    /// Same physical directory as one seen earlier in the scan.
    Duplicate,
}

impl DirStatus {
    /// Check if this directory was fully scanned.
    pub fn is_scanned(&self) -> bool {
        matches!(self, DirStatus::Scanned)
    }

    /// Check if this directory was skipped for any reason.
    pub fn is_skipped(&self) -> bool {
        matches!(self, DirStatus::Skipped(_))
    }

    /// Check if this directory is a duplicate.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DirStatus::Duplicate)
    }
}

/// Size, count, time span and composition of a set of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirStats {
    /// Sum of regular file lengths in bytes.
    pub size: u64,
    /// Number of regular files.
    pub file_count: u64,
    /// Oldest modification time among the files.
    pub oldest_modified: Option<SystemTime>,
    /// Newest modification time among the files.
    pub newest_modified: Option<SystemTime>,
    /// Bytes per content category (empty when classification is off).
    pub types: TypeHistogram,
}

impl DirStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one regular file.
    pub fn record_file(
        &mut self,
        size: u64,
        modified: Option<SystemTime>,
        category: Option<ContentCategory>,
    ) {
        self.size = self.size.saturating_add(size);
        self.file_count += 1;
        if let Some(modified) = modified {
            self.include_time(modified);
        }
        if let Some(category) = category {
            self.types.add(category, size);
        }
    }

    /// Add another set of stats into this one.
    pub fn merge(&mut self, other: &DirStats) {
        self.size = self.size.saturating_add(other.size);
        self.file_count += other.file_count;
        if let Some(t) = other.oldest_modified {
            self.include_time(t);
        }
        if let Some(t) = other.newest_modified {
            self.include_time(t);
        }
        self.types.merge(&other.types);
    }

    fn include_time(&mut self, t: SystemTime) {
        if self.oldest_modified.is_none_or(|old| t < old) {
            self.oldest_modified = Some(t);
        }
        if self.newest_modified.is_none_or(|new| t > new) {
            self.newest_modified = Some(t);
        }
    }
}

/// One visited directory.
///
/// `own` is written once by the scanner and never changed afterwards;
/// `total` is derived from the `own` stats of the subtree by aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Absolute, normalized path.
    pub path: PathBuf,
    /// Terminal status.
    pub status: DirStatus,
    /// Files directly inside this directory.
    pub own: DirStats,
    /// Files in the whole counted subtree, including `own`.
    pub total: DirStats,
    /// Identity key, when the platform supplied one.
    pub identity: Option<IdentityKey>,
}

impl DirectoryRecord {
    /// Create a record for a fully scanned directory.
    pub fn scanned(path: impl Into<PathBuf>, own: DirStats) -> Self {
        Self::with_status(path, DirStatus::Scanned, own)
    }

    /// Create a record for a skipped directory with whatever was read.
    pub fn skipped(path: impl Into<PathBuf>, reason: SkipReason, own: DirStats) -> Self {
        Self::with_status(path, DirStatus::Skipped(reason), own)
    }

    /// Create a record for a duplicate directory; it owns nothing.
    pub fn duplicate(path: impl Into<PathBuf>, identity: IdentityKey) -> Self {
        let mut record = Self::with_status(path, DirStatus::Duplicate, DirStats::new());
        record.identity = Some(identity);
        record
    }

    fn with_status(path: impl Into<PathBuf>, status: DirStatus, own: DirStats) -> Self {
        Self {
            path: path.into(),
            status,
            own,
            total: own,
            identity: None,
        }
    }

    /// Attach an identity key.
    pub fn with_identity(mut self, identity: Option<IdentityKey>) -> Self {
        self.identity = identity;
        self
    }

    /// Bytes of files directly inside this directory.
    pub fn own_size(&self) -> u64 {
        self.own.size
    }

    /// Bytes of the whole counted subtree.
    pub fn total_size(&self) -> u64 {
        self.total.size
    }

    /// Number of path components; the root of a filesystem has depth 1.
    pub fn depth(&self) -> usize {
        self.path.components().count()
    }

    /// Parent directory path, if any.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Reset the cumulative stats to the own-level stats.
    pub fn reset_total(&mut self) {
        self.total = if self.status.is_duplicate() {
            DirStats::new()
        } else {
            self.own
        };
    }
}
