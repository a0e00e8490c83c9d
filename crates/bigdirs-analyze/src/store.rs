//! Persistence of snapshots between runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use bigdirs_core::{DirectoryRecord, Snapshot};

/// Errors from loading or saving a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Loads the previous run's sizes and stores the current one.
pub trait SnapshotStore {
    /// Load the stored snapshot. `Ok(None)` means there is none yet.
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError>;

    /// Capture aggregated `records` and store them.
    fn save_records(
        &self,
        root: &Path,
        records: &[DirectoryRecord],
        now: DateTime<Utc>,
    ) -> Result<(), SnapshotError> {
        self.save(&Snapshot::from_records(root, records, now))
    }
}

/// Snapshot kept as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for scans of `root`, inside `dir`.
    pub fn for_root(dir: &Path, root: &Path) -> Self {
        Self::new(dir.join(snapshot_file_name(root)))
    }

    /// Platform data directory for snapshots.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("bigdirs").join("snapshots"))
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no previous snapshot");
                return Ok(None);
            }
            Err(source) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SnapshotError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let write_err = |source: io::Error| SnapshotError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!(
            path = %self.path.display(),
            entries = snapshot.len(),
            "saved snapshot"
        );
        Ok(())
    }
}

/// File name for the snapshot of `root`.
///
/// ASCII alphanumerics are kept, `/` becomes `_` and every other byte is
/// written as `-xx` hex, so distinct roots never share a file.
pub fn snapshot_file_name(root: &Path) -> String {
    let raw = root.to_string_lossy();
    let mut name = String::with_capacity(raw.len() + 5);
    for byte in raw.bytes() {
        match byte {
            b'/' => name.push('_'),
            b if b.is_ascii_alphanumeric() => name.push(char::from(b)),
            b => name.push_str(&format!("-{b:02x}")),
        }
    }
    name.push_str(".json");
    name
}
