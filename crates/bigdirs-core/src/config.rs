//! Scan configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Time allowed for listing one directory before it is abandoned.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(2);

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// User exclusions: path prefixes, or glob patterns when they contain
    /// any of `*?[{`.
    #[builder(default)]
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum time spent listing a single directory.
    #[builder(default = "DEFAULT_SLOW_THRESHOLD")]
    #[serde(default = "default_slow_threshold")]
    pub slow_threshold: Duration,

    /// Classify files by extension into content categories.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub classify: bool,

    /// Skip the built-in pseudo-directories (`proc`, `sys`, `dev`, ...).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub builtin_exclusions: bool,

    /// Additional exact paths never to enter, such as network mounts.
    #[builder(default)]
    #[serde(default)]
    pub extra_exclusions: Vec<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_slow_threshold() -> Duration {
    DEFAULT_SLOW_THRESHOLD
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if self.slow_threshold.is_some_and(|t| t.is_zero()) {
            return Err("Slow threshold must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
            classify: true,
            builtin_exclusions: true,
            extra_exclusions: Vec::new(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
