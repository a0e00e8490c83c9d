//! Directory identity probing for duplicate detection.

use std::collections::HashSet;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use bigdirs_core::IdentityKey;

/// Result of probing a path's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The platform supplied a stable key.
    Key(IdentityKey),
    /// No key is available; the duplicate check must be bypassed.
    Unsupported,
}

/// Supplies platform identity keys for directories.
pub trait IdentityProber {
    /// Probe the identity of `path`.
    fn identify(&self, path: &Path) -> Probe;
}

/// Prober backed by filesystem metadata (device and inode on Unix).
///
/// On other platforms every probe reports [`Probe::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataProber;

impl IdentityProber for MetadataProber {
    #[cfg(unix)]
    fn identify(&self, path: &Path) -> Probe {
        match std::fs::symlink_metadata(path) {
            Ok(metadata) => Probe::Key(IdentityKey::new(metadata.dev(), metadata.ino())),
            Err(_) => Probe::Unsupported,
        }
    }

    #[cfg(not(unix))]
    fn identify(&self, _path: &Path) -> Probe {
        Probe::Unsupported
    }
}

/// Prober that never supplies a key, turning duplicate detection off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

impl IdentityProber for NoIdentity {
    fn identify(&self, _path: &Path) -> Probe {
        Probe::Unsupported
    }
}

/// Tracks identity keys seen during one scan.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: HashSet<IdentityKey>,
}

impl IdentityTracker {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a key. Returns `true` if this is the first time seeing it.
    pub fn track(&mut self, key: IdentityKey) -> bool {
        self.seen.insert(key)
    }
}
