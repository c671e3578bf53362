//! Configuration management
//!
//! Settings are read from a TOML file. Every section and field has a
//! default, so a partial (or empty) file is valid.
//!
//! ```toml
//! [logs]
//! base_path = "D:\\SvcFab\\observer_logs"
//! verbose = false
//!
//! [archive]
//! daily = true
//! max_bytes = 10485760
//! max_archives = 14
//!
//! [retry]
//! max_attempts = 5
//! delay_ms = 1000
//! ```

use crate::constants::{
    DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_FILE_BYTES,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_RETRY_DELAY_MS,
};
use crate::error::{LogError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

// =============================================================================
// Application Configuration
// =============================================================================

/// Logging subsystem configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logs: LogsConfig,
    pub archive: ArchiveConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Base log directory (empty = platform default)
    pub base_path: Option<String>,
    /// Initial `info` gating of new channels
    pub verbose: bool,
    /// Records buffered per channel target
    pub queue_capacity: usize,
    /// Background flush interval (milliseconds)
    pub flush_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Archive the active file when the UTC day changes
    pub daily: bool,
    /// Archive the active file at this size (0 = unbounded)
    pub max_bytes: u64,
    /// Archives kept per channel (0 = keep all)
    pub max_archives: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            verbose: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            daily: true,
            max_bytes: DEFAULT_MAX_FILE_BYTES,
            max_archives: 0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

impl Config {
    /// Reject values the subsystem cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(LogError::ConfigValidation {
                field: "retry.max_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if self.logs.queue_capacity == 0 {
            return Err(LogError::ConfigValidation {
                field: "logs.queue_capacity",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Parse and validate a config file
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| LogError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| LogError::ConfigValidation {
        field: "config",
        reason: format!("{}: {}", path.display(), e),
    })?;
    config.validate()?;
    Ok(config)
}

/// Load config from file, falling back to defaults on any problem
pub fn load(path: &Path) -> Config {
    match load_from(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
