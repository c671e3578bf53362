//! Retried file writes and deletes
//!
//! Nothing to write and nothing to delete are not errors: both return
//! `Ok(false)` without touching the file system.

use crate::error::{LogError, Result};
use crate::retry::RetryPolicy;
use std::fs;
use std::io;
use std::path::Path;

/// Overwrite `path` with `content` using the default retry policy
pub fn write_file(path: impl AsRef<Path>, content: &str) -> Result<bool> {
    RetryPolicy::default().write_file(path, content)
}

/// Delete `path` using the default retry policy
pub fn delete_file(path: impl AsRef<Path>) -> Result<bool> {
    RetryPolicy::default().delete_file(path)
}

impl RetryPolicy {
    /// Overwrite `path` with `content`, creating parent directories as needed
    ///
    /// Returns `Ok(false)` for empty content or when every attempt hit contention.
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str) -> Result<bool> {
        let path = path.as_ref();
        if content.is_empty() {
            return Ok(false);
        }
        check_path(path)?;

        self.run(path, || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)
        })
    }

    /// Delete `path`; `Ok(true)` only once the file is gone
    ///
    /// An empty or missing path is a no-op returning `Ok(false)`.
    pub fn delete_file(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Ok(false);
        }
        check_path(path)?;
        if !path.is_file() {
            return Ok(false);
        }

        self.run(path, || ignore_not_found(fs::remove_file(path)))
    }

    /// Async form of [`write_file`](Self::write_file)
    pub async fn write_file_async(&self, path: impl AsRef<Path>, content: &str) -> Result<bool> {
        let path = path.as_ref();
        if content.is_empty() {
            return Ok(false);
        }
        check_path(path)?;

        self.run_async(path, || async move {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await
        })
        .await
    }

    /// Async form of [`delete_file`](Self::delete_file)
    pub async fn delete_file_async(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Ok(false);
        }
        check_path(path)?;
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Ok(false),
        }

        self.run_async(path, || async move {
            ignore_not_found(tokio::fs::remove_file(path).await)
        })
        .await
    }
}

// Someone else removing the file between attempts still leaves it deleted.
fn ignore_not_found(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Reject paths no retry could ever write to
fn check_path(path: &Path) -> Result<()> {
    let reason = if path.as_os_str().is_empty() {
        Some("path is empty")
    } else if path.to_string_lossy().contains('\0') {
        Some("path contains a NUL byte")
    } else if path.file_name().is_none() {
        Some("path has no file name")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(LogError::InvalidPath {
            path: path.to_path_buf(),
            reason,
        }),
        None => Ok(()),
    }
}
