//! Per-observer log channel
//!
//! A `Channel` is a lightweight handle onto a registered target. Leveled
//! writes go straight to the target's queue without touching the registry.
//! Verbosity belongs to the handle, so two observers sharing a name can
//! still gate `info` differently.

use super::file::FileTarget;
use super::{Level, LogRecord};
use crate::constants::TRACE_TAG_SEPARATOR;
use crate::error::Result;
use crate::retry::RetryPolicy;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct Channel {
    target: Arc<FileTarget>,
    target_id: String,
    verbose: AtomicBool,
    retry: RetryPolicy,
}

impl Channel {
    pub(crate) fn new(
        target: Arc<FileTarget>,
        target_id: String,
        verbose: bool,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            target,
            target_id,
            verbose: AtomicBool::new(verbose),
            retry,
        }
    }

    /// Channel name chosen by the owning observer
    pub fn name(&self) -> &str {
        self.target.name()
    }

    /// Resolved absolute log file path
    pub fn path(&self) -> &Path {
        self.target.path()
    }

    /// Identifier of the registry target this channel routes to
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    /// Whether a message at `level` would be forwarded
    pub fn is_enabled(&self, level: Level) -> bool {
        level != Level::Info || self.is_verbose()
    }

    /// True when both handles write to the same registered target
    pub fn shares_target_with(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.target, &other.target)
    }

    /// Diagnostic detail tagged with the observer that produced it
    pub fn trace(&self, observer: &str, message: impl fmt::Display) {
        self.forward(
            Level::Trace,
            format!("{}{}{}", observer, TRACE_TAG_SEPARATOR, message),
        );
    }

    /// Dropped unless the channel is verbose
    pub fn info(&self, message: impl fmt::Display) {
        if !self.is_verbose() {
            return;
        }
        self.forward(Level::Info, message.to_string());
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.forward(Level::Warn, message.to_string());
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.forward(Level::Error, message.to_string());
    }

    /// Write at a runtime-chosen level (`Trace` carries no observer tag here)
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if self.is_enabled(level) {
            self.forward(level, message.to_string());
        }
    }

    // After shutdown the target rejects records; that is the terminal state, not an error.
    fn forward(&self, level: Level, message: String) {
        let _ = self.target.submit(LogRecord::new(level, message));
    }

    /// Commit this channel's queued lines to disk
    pub fn flush(&self) -> bool {
        self.target.flush()
    }

    /// Delete this channel's active log file
    ///
    /// The writer closes its handle and deletes the file before taking the
    /// next line, which then starts a new file. `Ok(false)` when there is no
    /// file or it stayed locked.
    pub fn delete_log_file(&self) -> Result<bool> {
        self.target.delete_file(&self.retry)
    }

    /// Overwrite an arbitrary file with this channel's retry policy
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str) -> Result<bool> {
        self.retry.write_file(path, content)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name())
            .field("path", &self.path())
            .field("target_id", &self.target_id)
            .field("verbose", &self.is_verbose())
            .finish()
    }
}
