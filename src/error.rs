//! Centralized error types for the logging subsystem
//!
//! All errors are represented by the `LogError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, LogError>`.
//!
//! Transient file contention is never an error here: the retry path reports
//! it as `Ok(false)`. Only malformed input and failures that retrying cannot
//! fix end up in this enum.

use std::fmt;
use std::path::PathBuf;

/// All logging subsystem errors
#[derive(Debug)]
pub enum LogError {
    // === Input ===
    /// Channel name cannot be used as a folder/file name
    InvalidChannelName { name: String, reason: &'static str },
    /// Path is malformed (empty, embedded NUL, no file name)
    InvalidPath { path: PathBuf, reason: &'static str },

    // === IO ===
    /// File system operation failed with a non-retryable error
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Lifecycle ===
    /// The registry was shut down; no new channels can be created
    RegistryClosed,
    /// Failed to spawn a target writer thread
    Spawn {
        channel: String,
        source: std::io::Error,
    },

    // === Config ===
    /// Failed to read the config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. }
            | Self::Spawn { source, .. }
            | Self::ConfigRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannelName { name, reason } => {
                write!(f, "Invalid channel name '{}': {}", name, reason)
            }
            Self::InvalidPath { path, reason } => {
                write!(f, "Invalid path '{}': {}", path.display(), reason)
            }
            Self::Io { path, source } => write!(f, "IO error: {}: {}", path.display(), source),
            Self::RegistryClosed => write!(f, "Log registry has been shut down"),
            Self::Spawn { channel, .. } => {
                write!(f, "Cannot start writer for channel {}", channel)
            }
            Self::ConfigRead { path, .. } => {
                write!(f, "Cannot read config: {}", path.display())
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
        }
    }
}

/// Alias for Result with LogError
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_exposes_source() {
        let err = LogError::Io {
            path: PathBuf::from("/tmp/x.log"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "bad"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/x.log"));
    }

    #[test]
    fn test_registry_closed_message() {
        assert_eq!(
            LogError::RegistryClosed.to_string(),
            "Log registry has been shut down"
        );
        assert!(LogError::RegistryClosed.source().is_none());
    }
}
