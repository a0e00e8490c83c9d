//! Breadth-first directory size scanner.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indexmap::IndexMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use bigdirs_core::{
    DirStats, DirectoryRecord, ScanConfig, ScanError, ScanOutcome, ScanWarning, SkipReason,
};

use crate::classify::classify;
use crate::exclude::ExclusionPolicy;
use crate::identity::{IdentityProber, IdentityTracker, MetadataProber, Probe};
use crate::mounts::MountClassifier;
use crate::progress::{ProgressTracker, ScanProgress};
use crate::reader::{DirReader, EntryKind, LocalFs};

/// Capacity of the progress broadcast channel. Slow subscribers skip
/// ahead rather than block the scan.
pub const PROGRESS_CHANNEL_SIZE: usize = 256;

/// Single-threaded breadth-first scanner.
///
/// One directory is read at a time, shallowest first, so an interrupted
/// scan still holds fully resolved upper levels of the tree.
pub struct Scanner<R = LocalFs, P = MetadataProber> {
    reader: R,
    prober: P,
    mounts: Option<Box<dyn MountClassifier + Send + Sync>>,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl Scanner {
    /// Create a scanner for the local filesystem.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Self {
            reader: LocalFs,
            prober: MetadataProber,
            mounts: None,
            progress_tx,
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// What visiting one directory produced.
struct Visit {
    record: DirectoryRecord,
    children: Vec<PathBuf>,
    warning: Option<ScanWarning>,
}

impl<R: DirReader, P: IdentityProber> Scanner<R, P> {
    /// Replace the directory reader.
    pub fn with_reader<R2: DirReader>(self, reader: R2) -> Scanner<R2, P> {
        Scanner {
            reader,
            prober: self.prober,
            mounts: self.mounts,
            progress_tx: self.progress_tx,
        }
    }

    /// Replace the identity prober.
    pub fn with_prober<P2: IdentityProber>(self, prober: P2) -> Scanner<R, P2> {
        Scanner {
            reader: self.reader,
            prober,
            mounts: self.mounts,
            progress_tx: self.progress_tx,
        }
    }

    /// Consult `classifier` for network mounts when scanning a filesystem root.
    pub fn with_mount_classifier(
        mut self,
        classifier: impl MountClassifier + Send + Sync + 'static,
    ) -> Self {
        self.mounts = Some(Box::new(classifier));
        self
    }

    /// Subscribe to scan progress updates.
    ///
    /// The stream closes when the scanner is dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan `config.root` until the queue drains or `cancel` fires.
    ///
    /// Cancellation is not an error: the records gathered so far are returned
    /// with `completed = false`. The only fatal per-directory failure is an
    /// unreadable root.
    pub fn scan(
        &self,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        let root = self
            .reader
            .resolve_root(&config.root)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotADirectory => ScanError::NotADirectory {
                    path: config.root.clone(),
                },
                _ => ScanError::io(&config.root, e),
            })?;

        let mut policy_config = config.clone();
        if root.parent().is_none() {
            if let Some(mounts) = &self.mounts {
                let found = mounts.non_local_mounts(&root);
                debug!(count = found.len(), "excluding non-local mounts");
                policy_config.extra_exclusions.extend(found);
            }
        }
        let policy = ExclusionPolicy::from_config(&policy_config, &root)?;

        info!(
            root = %root.display(),
            slow_threshold_ms = config.slow_threshold.as_millis() as u64,
            "starting scan"
        );

        let mut queue = VecDeque::from([root.clone()]);
        let mut records: IndexMap<PathBuf, DirectoryRecord> = IndexMap::new();
        let mut identities = IdentityTracker::new();
        let mut tracker = ProgressTracker::new();
        let mut warnings = Vec::new();

        let completed = loop {
            if queue.is_empty() {
                break true;
            }
            if cancel.is_cancelled() {
                break false;
            }
            let Some(path) = queue.pop_front() else {
                break true;
            };

            let visit = self.visit(&path, &root, config, &policy, &mut identities)?;

            tracker.record_dir(visit.record.own_size(), visit.record.status.is_skipped());
            let _ = self.progress_tx.send(tracker.snapshot(path.clone()));

            if let Some(warning) = visit.warning {
                warnings.push(warning);
            }
            queue.extend(visit.children);

            debug_assert!(!records.contains_key(&path), "directory visited twice");
            records.insert(path, visit.record);
        };

        let scan_duration = tracker.elapsed();
        info!(
            dirs = records.len(),
            pending = queue.len(),
            warnings = warnings.len(),
            completed,
            elapsed_ms = scan_duration.as_millis() as u64,
            "scan finished"
        );

        Ok(ScanOutcome::new(
            root,
            records.into_values().collect(),
            completed,
            scan_duration,
            warnings,
        ))
    }

    /// Take one directory from pending to a terminal state.
    fn visit(
        &self,
        path: &Path,
        root: &Path,
        config: &ScanConfig,
        policy: &ExclusionPolicy,
        identities: &mut IdentityTracker,
    ) -> Result<Visit, ScanError> {
        if let Some(rule) = policy.matches(path) {
            debug!(path = %path.display(), ?rule, "excluded");
            return Ok(Visit {
                record: DirectoryRecord::skipped(path, SkipReason::Excluded, DirStats::new()),
                children: Vec::new(),
                warning: None,
            });
        }

        let identity = match self.prober.identify(path) {
            Probe::Key(key) => {
                if !identities.track(key) {
                    debug!(path = %path.display(), "duplicate directory");
                    return Ok(Visit {
                        record: DirectoryRecord::duplicate(path, key),
                        children: Vec::new(),
                        warning: None,
                    });
                }
                Some(key)
            }
            Probe::Unsupported => None,
        };

        let entries = match self.reader.read_dir(path) {
            Ok(entries) => entries,
            Err(source) if path == root => {
                return Err(ScanError::RootUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "unreadable directory");
                return Ok(Visit {
                    record: DirectoryRecord::skipped(path, SkipReason::ReadFailed, DirStats::new())
                        .with_identity(identity),
                    children: Vec::new(),
                    warning: Some(ScanWarning::read_error(path, &err)),
                });
            }
        };

        let started = Instant::now();
        let mut own = DirStats::new();
        let mut children = Vec::new();
        let mut warning = None;
        let mut entries_read: u64 = 0;
        let mut slow = false;

        for entry in entries {
            if started.elapsed() > config.slow_threshold {
                slow = true;
                break;
            }
            entries_read += 1;

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(path = %path.display(), %err, "unreadable entry");
                    warning.get_or_insert_with(|| ScanWarning::entry_error(path, &err));
                    continue;
                }
            };

            match entry.kind {
                EntryKind::File => {
                    let category = config
                        .classify
                        .then(|| classify(&entry.name.to_string_lossy()));
                    own.record_file(entry.size, entry.modified, category);
                }
                EntryKind::Dir => children.push(entry.path),
                EntryKind::Other => {}
            }
        }

        if slow {
            let elapsed = started.elapsed();
            debug!(
                path = %path.display(),
                entries_read,
                partial_bytes = own.size,
                "directory too slow, keeping partial size"
            );
            return Ok(Visit {
                record: DirectoryRecord::skipped(path, SkipReason::Slow, own)
                    .with_identity(identity),
                children: Vec::new(),
                warning: Some(ScanWarning::slow_directory(path, elapsed, entries_read)),
            });
        }

        Ok(Visit {
            record: DirectoryRecord::scanned(path, own).with_identity(identity),
            children,
            warning,
        })
    }
}
