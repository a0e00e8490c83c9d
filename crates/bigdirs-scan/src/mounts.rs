//! Detection of network and remote mounts to keep out of a scan.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Filesystem types served over the network.
const NETWORK_FS_TYPES: &[&str] = &[
    "nfs",
    "nfs4",
    "cifs",
    "smb3",
    "smbfs",
    "sshfs",
    "9p",
    "afs",
    "ceph",
    "glusterfs",
    "lustre",
    "gpfs",
    "davfs",
    "ncpfs",
    "coda",
];

/// FUSE subtypes served over the network.
const NETWORK_FUSE_SUBTYPES: &[&str] = &["sshfs", "rclone", "s3fs", "gcsfuse", "davfs2"];

/// Supplies mount points that must not be traversed.
pub trait MountClassifier {
    /// Mount points below `root` that are not local storage.
    fn non_local_mounts(&self, root: &Path) -> HashSet<PathBuf>;
}

/// Mount classifier reading the kernel mount table (`/proc/mounts`).
///
/// Where the table does not exist the classifier reports no mounts.
#[derive(Debug, Clone)]
pub struct ProcMounts {
    table: PathBuf,
}

impl ProcMounts {
    /// Read the system mount table.
    pub fn new() -> Self {
        Self::with_table("/proc/mounts")
    }

    /// Read a mount table from a custom location.
    pub fn with_table(table: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl Default for ProcMounts {
    fn default() -> Self {
        Self::new()
    }
}

impl MountClassifier for ProcMounts {
    fn non_local_mounts(&self, root: &Path) -> HashSet<PathBuf> {
        match std::fs::read_to_string(&self.table) {
            Ok(content) => parse_mounts(&content, root),
            Err(err) => {
                debug!(table = %self.table.display(), %err, "mount table unavailable");
                HashSet::new()
            }
        }
    }
}

/// Extract network mount points under `root` from mount table text.
pub fn parse_mounts(content: &str, root: &Path) -> HashSet<PathBuf> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            is_network_fs(fs_type).then(|| PathBuf::from(unescape_mount_point(mount_point)))
        })
        .filter(|mount| mount.starts_with(root) && mount != root)
        .collect()
}

/// Check if a filesystem type names network storage.
pub fn is_network_fs(fs_type: &str) -> bool {
    let fs_type = fs_type.to_ascii_lowercase();
    if let Some(subtype) = fs_type.strip_prefix("fuse.") {
        return NETWORK_FUSE_SUBTYPES.contains(&subtype);
    }
    NETWORK_FS_TYPES.contains(&fs_type.as_str())
}

/// Decode the octal escapes (`\040` for space, ...) used in mount tables.
fn unescape_mount_point(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
