//! Directory listing abstraction.
//!
//! The scanner reads directories through [`DirReader`] so that listing is a
//! lazy, one-pass iterator it can abandon part way through.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Kind of directory entry, as reported without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Real directory (not a symlink to one).
    Dir,
    /// Symlinks, sockets, devices and the like.
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    /// Full path of the entry.
    pub path: PathBuf,
    /// File name.
    pub name: OsString,
    /// Entry kind.
    pub kind: EntryKind,
    /// Length in bytes for regular files, 0 otherwise.
    pub size: u64,
    /// Modification time for regular files, when available.
    pub modified: Option<SystemTime>,
}

impl DirEntryInfo {
    /// Create an entry for a regular file.
    pub fn file(path: impl Into<PathBuf>, size: u64, modified: Option<SystemTime>) -> Self {
        Self::new(path.into(), EntryKind::File, size, modified)
    }

    /// Create an entry for a subdirectory.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::Dir, 0, None)
    }

    /// Create an entry for anything else.
    pub fn other(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::Other, 0, None)
    }

    fn new(path: PathBuf, kind: EntryKind, size: u64, modified: Option<SystemTime>) -> Self {
        let name = path.file_name().map(OsString::from).unwrap_or_default();
        Self {
            path,
            name,
            kind,
            size,
            modified,
        }
    }
}

/// Lists the immediate entries of a directory.
pub trait DirReader {
    /// Lazy iterator over the entries of one directory.
    type Entries: Iterator<Item = io::Result<DirEntryInfo>>;

    /// Open `path` for listing. Failing here means nothing was read.
    fn read_dir(&self, path: &Path) -> io::Result<Self::Entries>;

    /// Turn the configured root into the absolute path used as record key.
    fn resolve_root(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Reader for the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl DirReader for LocalFs {
    type Entries = LocalEntries;

    fn read_dir(&self, path: &Path) -> io::Result<Self::Entries> {
        Ok(LocalEntries {
            inner: fs::read_dir(path)?,
        })
    }

    fn resolve_root(&self, path: &Path) -> io::Result<PathBuf> {
        let root = fs::canonicalize(path)?;
        if !fs::metadata(&root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(root)
    }
}

/// Entries of a local directory.
#[derive(Debug)]
pub struct LocalEntries {
    inner: fs::ReadDir,
}

impl Iterator for LocalEntries {
    type Item = io::Result<DirEntryInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(err) => return Some(Err(err)),
        };
        Some(entry_info(&entry))
    }
}

fn entry_info(entry: &fs::DirEntry) -> io::Result<DirEntryInfo> {
    let path = entry.path();
    let file_type = entry.file_type()?;

    if file_type.is_dir() {
        Ok(DirEntryInfo::dir(path))
    } else if file_type.is_file() {
        let metadata = entry.metadata()?;
        Ok(DirEntryInfo::file(path, metadata.len(), metadata.modified().ok()))
    } else {
        Ok(DirEntryInfo::other(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_listing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("file.txt"), "hello").unwrap();

        let mut entries: Vec<_> = LocalFs
            .read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "file.txt");
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].size, 5);
        assert!(entries[0].modified.is_some());
        assert_eq!(entries[1].name, "sub");
        assert_eq!(entries[1].kind, EntryKind::Dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        let link = LocalFs
            .read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap())
            .find(|e| e.name == "link")
            .unwrap();
        assert_eq!(link.kind, EntryKind::Other);
    }

    #[test]
    fn test_missing_directory() {
        assert!(LocalFs.read_dir(Path::new("/definitely/not/here/bigdirs")).is_err());
    }
}
