//! Persistent user settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Defaults read from the user's config file. Command-line flags win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// How many directories to list.
    pub top: usize,
    /// Per-directory time budget, e.g. "2s" or "500ms".
    pub slow_threshold: String,
    /// Exclusions added to every scan.
    pub exclude: Vec<String>,
    /// Where snapshots are kept (platform data dir when unset).
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            top: 15,
            slow_threshold: "2s".to_string(),
            exclude: Vec::new(),
            snapshot_dir: None,
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("bigdirs").join("config.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from `path`. A missing file gives defaults silently, an
    /// invalid one gives defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&content).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "ignoring invalid settings file");
            Self::default()
        })
    }
}
