//! Ranking of the largest directories.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use bigdirs_core::{ContentCategory, DirStats, DirStatus, DirectoryRecord, Snapshot};

/// Configuration for ranking.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct TopConfig {
    /// Maximum number of directories to report.
    #[builder(default = "15")]
    pub limit: usize,

    /// Directories smaller than this are never reported.
    #[builder(default = "0")]
    pub min_size: u64,
}

impl Default for TopConfig {
    fn default() -> Self {
        Self {
            limit: 15,
            min_size: 0,
        }
    }
}

impl TopConfig {
    /// Create a new config builder.
    pub fn builder() -> TopConfigBuilder {
        TopConfigBuilder::default()
    }
}

/// Change of a directory's total size since the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delta {
    /// Not present in the previous snapshot.
    New,
    /// Signed change in bytes.
    Changed(i64),
}

impl Delta {
    /// Compare a current size with the previous one, if there was one.
    pub fn between(current: u64, previous: Option<u64>) -> Self {
        match previous {
            Some(prev) => Delta::Changed(signed_diff(current, prev)),
            None => Delta::New,
        }
    }
}

fn signed_diff(current: u64, previous: u64) -> i64 {
    if current >= previous {
        i64::try_from(current - previous).unwrap_or(i64::MAX)
    } else {
        i64::try_from(previous - current).map_or(i64::MIN, |d| -d)
    }
}

/// Share of one content category in a directory's total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: ContentCategory,
    pub bytes: u64,
    /// Percentage of the directory's total size.
    pub percent: f64,
}

/// One entry of the ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDirectory {
    /// 1-based position.
    pub rank: usize,
    pub path: PathBuf,
    pub total_size: u64,
    pub own_size: u64,
    pub file_count: u64,
    pub status: DirStatus,
    /// Newest file modification in the subtree.
    pub newest_modified: Option<SystemTime>,
    /// Content categories by descending size.
    pub composition: Vec<CategoryShare>,
    /// Change since the previous snapshot, when one was given.
    pub delta: Option<Delta>,
}

/// Result of ranking a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopReport {
    pub directories: Vec<RankedDirectory>,
    /// Directories that were candidates for ranking.
    pub considered: usize,
    /// When the snapshot used for deltas was taken.
    pub compared_to: Option<DateTime<Utc>>,
}

impl TopReport {
    /// Check if nothing was ranked.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

/// Selects the largest directories by total size.
pub struct TopN {
    config: TopConfig,
}

impl TopN {
    /// Create a ranker with default config.
    pub fn new() -> Self {
        Self {
            config: TopConfig::default(),
        }
    }

    /// Create a ranker with custom config.
    pub fn with_config(config: TopConfig) -> Self {
        Self { config }
    }

    /// Rank aggregated `records`, comparing with `previous` when given.
    ///
    /// Duplicates are never ranked. Ties are broken by path.
    pub fn rank(&self, records: &[DirectoryRecord], previous: Option<&Snapshot>) -> TopReport {
        let previous_sizes = previous.map(Snapshot::sizes);

        let candidates = records
            .iter()
            .filter(|r| !r.status.is_duplicate() && r.total_size() >= self.config.min_size)
            .collect_vec();
        let considered = candidates.len();

        let directories = candidates
            .into_iter()
            .sorted_by(|a, b| {
                b.total_size()
                    .cmp(&a.total_size())
                    .then_with(|| a.path.cmp(&b.path))
            })
            .take(self.config.limit)
            .enumerate()
            .map(|(i, record)| RankedDirectory {
                rank: i + 1,
                path: record.path.clone(),
                total_size: record.total_size(),
                own_size: record.own_size(),
                file_count: record.total.file_count,
                status: record.status,
                newest_modified: record.total.newest_modified,
                composition: composition(&record.total),
                delta: previous_sizes.as_ref().map(|sizes| {
                    Delta::between(record.total_size(), sizes.get(record.path.as_path()).copied())
                }),
            })
            .collect();

        TopReport {
            directories,
            considered,
            compared_to: previous.map(|s| s.timestamp),
        }
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self::new()
    }
}

/// Category shares of `stats.size`, largest first. Empty when nothing was
/// classified or the size is zero.
pub fn composition(stats: &DirStats) -> Vec<CategoryShare> {
    if stats.size == 0 {
        return Vec::new();
    }
    stats
        .types
        .sorted_by_size()
        .into_iter()
        .map(|(category, bytes)| CategoryShare {
            category,
            bytes,
            percent: bytes as f64 / stats.size as f64 * 100.0,
        })
        .collect()
}
