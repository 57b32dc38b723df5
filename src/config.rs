//! Analysis configuration
//!
//! Loaded from an optional TOML file and overridden by command-line flags.
//! Every field has a default so partial files are accepted.

use crate::window::{
    WindowSizes, DEFAULT_MAX_WINDOW_EXP, DEFAULT_MIN_WINDOW_EXP, MAX_WINDOW_EXP,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for one analysis run
///
/// # Example
/// ```
/// use heapshape::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.threads, 32);
/// assert_eq!(config.file_name, "shapes.binpb.zst");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Worker pool size (one file per worker at a time)
    pub threads: usize,

    /// Recording file name expected inside each benchmark directory
    pub file_name: String,

    /// Smallest window is `2^min_window_exp` bytes
    pub min_window_exp: u32,

    /// Largest window is `2^max_window_exp` bytes
    pub max_window_exp: u32,

    /// Per-file time limit in seconds; `None` waits indefinitely
    pub timeout_secs: Option<u64>,

    /// Number of ranks in the coverage table
    pub coverage_ranks: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threads: 32,
            file_name: "shapes.binpb.zst".to_string(),
            min_window_exp: DEFAULT_MIN_WINDOW_EXP, // 64 B
            max_window_exp: DEFAULT_MAX_WINDOW_EXP, // 64 KiB
            timeout_secs: None,
            coverage_ranks: 32,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Window family described by the exponent range
    pub fn window_sizes(&self) -> Result<WindowSizes, String> {
        WindowSizes::from_exponents(self.min_window_exp, self.max_window_exp)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err("threads must be >= 1, got 0".to_string());
        }

        if self.file_name.is_empty() {
            return Err("file_name must not be empty".to_string());
        }

        if self.min_window_exp > self.max_window_exp {
            return Err(format!(
                "min_window_exp ({}) must not exceed max_window_exp ({})",
                self.min_window_exp, self.max_window_exp
            ));
        }

        if self.max_window_exp > MAX_WINDOW_EXP {
            return Err(format!(
                "max_window_exp must be <= {}, got {}",
                MAX_WINDOW_EXP, self.max_window_exp
            ));
        }

        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be positive when set".to_string());
        }

        if self.coverage_ranks == 0 {
            return Err("coverage_ranks must be >= 1, got 0".to_string());
        }

        Ok(())
    }
}
