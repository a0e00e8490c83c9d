//! Scan progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress event, emitted once per directory reaching a terminal state.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Directory that just finished.
    pub current_path: PathBuf,
    /// Directories finished so far, including skipped and duplicate ones.
    pub dirs_processed: u64,
    /// Bytes of files summed so far, partial reads included.
    pub bytes_scanned: u64,
    /// Directories skipped or abandoned so far.
    pub dirs_skipped: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            current_path: PathBuf::new(),
            dirs_processed: 0,
            bytes_scanned: 0,
            dirs_skipped: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters owned by the traversal thread.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    dirs_processed: u64,
    bytes_scanned: u64,
    dirs_skipped: u64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            dirs_processed: 0,
            bytes_scanned: 0,
            dirs_skipped: 0,
        }
    }

    pub fn record_dir(&mut self, bytes: u64, skipped: bool) {
        self.dirs_processed += 1;
        self.bytes_scanned = self.bytes_scanned.saturating_add(bytes);
        if skipped {
            self.dirs_skipped += 1;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self, current_path: PathBuf) -> ScanProgress {
        ScanProgress {
            current_path,
            dirs_processed: self.dirs_processed,
            bytes_scanned: self.bytes_scanned,
            dirs_skipped: self.dirs_skipped,
            elapsed: self.start_time.elapsed(),
        }
    }
}
