//! Exclusion rules: which directories are never entered.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use bigdirs_core::{ScanConfig, ScanError};

/// Pseudo-filesystem and volatile directory names skipped by default.
pub const BUILTIN_EXCLUDED_NAMES: &[&str] = &["proc", "sys", "dev", "run", "tmp", "var"];

/// Which rule excluded a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionMatch {
    /// A user path prefix.
    Prefix,
    /// A user glob pattern.
    Pattern,
    /// A known non-local mount point.
    Mount,
    /// One of [`BUILTIN_EXCLUDED_NAMES`].
    Builtin,
}

/// Decides whether a directory must not be entered.
///
/// Evaluation is pure: it looks only at the path text, never at the disk.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    root: PathBuf,
    prefixes: Vec<PathBuf>,
    patterns: GlobSet,
    mounts: HashSet<PathBuf>,
    builtin: bool,
}

impl ExclusionPolicy {
    /// Build a policy.
    ///
    /// Entries of `exclude` containing any of `*?[{` are compiled as globs and
    /// matched against the whole path. Other entries are path prefixes;
    /// relative prefixes are taken relative to `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        exclude: &[String],
        mounts: impl IntoIterator<Item = PathBuf>,
        builtin: bool,
    ) -> Result<Self, ScanError> {
        Self::build(root.into(), None, exclude, mounts, builtin)
    }

    /// Build a policy from a scan config and the canonical root.
    ///
    /// Prefixes written under `config.root` as given (a symlink, or a relative
    /// path) are moved onto `root`.
    pub fn from_config(config: &ScanConfig, root: &Path) -> Result<Self, ScanError> {
        Self::build(
            root.to_path_buf(),
            Some(&config.root),
            &config.exclude,
            config.extra_exclusions.iter().cloned(),
            config.builtin_exclusions,
        )
    }

    fn build(
        root: PathBuf,
        given_root: Option<&Path>,
        exclude: &[String],
        mounts: impl IntoIterator<Item = PathBuf>,
        builtin: bool,
    ) -> Result<Self, ScanError> {
        let mut prefixes = Vec::new();
        let mut builder = GlobSetBuilder::new();

        for entry in exclude {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if is_glob(entry) {
                let glob = Glob::new(entry).map_err(|e| ScanError::InvalidConfig {
                    message: format!("bad exclude pattern {entry:?}: {e}"),
                })?;
                builder.add(glob);
            } else {
                let prefix = Path::new(entry);
                let under_given = given_root
                    .filter(|given| *given != root.as_path())
                    .and_then(|given| prefix.strip_prefix(given).ok());
                if let Some(rest) = under_given {
                    prefixes.push(root.join(rest));
                } else if prefix.is_absolute() {
                    prefixes.push(prefix.to_path_buf());
                } else {
                    prefixes.push(root.join(prefix));
                }
            }
        }

        let patterns = builder.build().map_err(|e| ScanError::InvalidConfig {
            message: format!("bad exclude patterns: {e}"),
        })?;

        Ok(Self {
            root,
            prefixes,
            patterns,
            mounts: mounts.into_iter().collect(),
            builtin,
        })
    }

    /// Check if `path` must not be entered.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.matches(path).is_some()
    }

    /// The first rule that excludes `path`, if any.
    ///
    /// The root is never excluded by the built-in names, so scanning `/tmp`
    /// directly still works.
    pub fn matches(&self, path: &Path) -> Option<ExclusionMatch> {
        if self.prefixes.iter().any(|p| path.starts_with(p)) {
            return Some(ExclusionMatch::Prefix);
        }
        if !self.patterns.is_empty() && self.patterns.is_match(path) {
            return Some(ExclusionMatch::Pattern);
        }
        if self.mounts.contains(path) {
            return Some(ExclusionMatch::Mount);
        }
        if self.builtin && path != self.root && is_builtin_name(path) {
            return Some(ExclusionMatch::Builtin);
        }
        None
    }
}

fn is_glob(entry: &str) -> bool {
    entry.contains(&['*', '?', '[', '{'][..])
}

fn is_builtin_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            BUILTIN_EXCLUDED_NAMES
                .iter()
                .any(|b| name.eq_ignore_ascii_case(b))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(exclude: &[&str]) -> ExclusionPolicy {
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        ExclusionPolicy::new("/", &exclude, Vec::new(), true).unwrap()
    }

    #[test]
    fn test_builtin_names() {
        let p = policy(&[]);
        assert_eq!(p.matches(Path::new("/proc")), Some(ExclusionMatch::Builtin));
        assert!(p.is_excluded(Path::new("/home/user/tmp")));
        assert!(p.is_excluded(Path::new("/srv/VAR")));
        assert!(!p.is_excluded(Path::new("/home")));
        assert!(!p.is_excluded(Path::new("/home/variables")));
    }

    #[test]
    fn test_root_exempt_from_builtin() {
        let p = ExclusionPolicy::new("/tmp", &[], Vec::new(), true).unwrap();
        assert!(!p.is_excluded(Path::new("/tmp")));
        assert!(p.is_excluded(Path::new("/tmp/build/tmp")));
    }

    #[test]
    fn test_builtin_disabled() {
        let p = ExclusionPolicy::new("/", &[], Vec::new(), false).unwrap();
        assert!(!p.is_excluded(Path::new("/proc")));
    }

    #[test]
    fn test_prefix_is_component_wise() {
        let p = policy(&["/home/user/cache"]);
        assert_eq!(
            p.matches(Path::new("/home/user/cache")),
            Some(ExclusionMatch::Prefix)
        );
        assert!(p.is_excluded(Path::new("/home/user/cache/deep/er")));
        assert!(!p.is_excluded(Path::new("/home/user/cache2")));
    }

    #[test]
    fn test_relative_prefix_joins_root() {
        let p = ExclusionPolicy::new("/data", &["build".to_string()], Vec::new(), true).unwrap();
        assert!(p.is_excluded(Path::new("/data/build")));
        assert!(!p.is_excluded(Path::new("/data/src/build")));
    }

    #[test]
    fn test_glob_patterns() {
        let p = policy(&["**/node_modules", "/srv/*/cache"]);
        assert_eq!(
            p.matches(Path::new("/home/a/project/node_modules")),
            Some(ExclusionMatch::Pattern)
        );
        assert!(p.is_excluded(Path::new("/srv/web/cache")));
        assert!(!p.is_excluded(Path::new("/srv/web/static")));
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let result = ExclusionPolicy::new("/", &["[unclosed".to_string()], Vec::new(), true);
        assert!(matches!(result, Err(ScanError::InvalidConfig { .. })));
    }

    #[test]
    fn test_mounts() {
        let p = ExclusionPolicy::new("/", &[], vec![PathBuf::from("/mnt/nas")], true).unwrap();
        assert_eq!(p.matches(Path::new("/mnt/nas")), Some(ExclusionMatch::Mount));
        assert!(!p.is_excluded(Path::new("/mnt")));
    }

    #[test]
    fn test_prefix_under_given_root_moves_to_canonical_root() {
        let config = ScanConfig::builder()
            .root("/home/me/link")
            .exclude(vec![
                "/home/me/link/cache".to_string(),
                "/home/me/link/logs/old".to_string(),
                "/elsewhere".to_string(),
            ])
            .build()
            .unwrap();
        let p = ExclusionPolicy::from_config(&config, Path::new("/data/real")).unwrap();

        assert_eq!(
            p.matches(Path::new("/data/real/cache")),
            Some(ExclusionMatch::Prefix)
        );
        assert!(p.is_excluded(Path::new("/data/real/logs/old/2024")));
        assert!(!p.is_excluded(Path::new("/data/real/logs")));
        assert!(p.is_excluded(Path::new("/elsewhere")));
    }

    #[test]
    fn test_relative_root_and_prefix() {
        let config = ScanConfig::builder()
            .root("work/link")
            .exclude(vec!["work/link/cache".to_string()])
            .build()
            .unwrap();
        let p = ExclusionPolicy::from_config(&config, Path::new("/abs/work/real")).unwrap();

        assert!(p.is_excluded(Path::new("/abs/work/real/cache")));
        assert!(!p.is_excluded(Path::new("/abs/work/real/work/link/cache")));
    }

    #[test]
    fn test_first_match_wins() {
        let p = policy(&["/home/tmp"]);
        assert_eq!(p.matches(Path::new("/home/tmp")), Some(ExclusionMatch::Prefix));
    }
}
