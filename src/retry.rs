//! Bounded retry with a fixed delay for fallible file operations
//!
//! Every destructive-but-recoverable file operation composes with
//! `RetryPolicy` instead of carrying its own loop.
//!
//! # Outcomes
//! - `Ok(true)`: the operation succeeded on some attempt
//! - `Ok(false)`: every attempt hit transient contention (or the wait was cancelled)
//! - `Err(_)`: a failure class retrying cannot fix, surfaced on first sight

use crate::constants::{CANCEL_POLL_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};
use crate::error::{LogError, Result};
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How a failed attempt is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Contention or a transient lock: wait and try again
    Transient,
    /// Malformed input or unsupported operation: give up immediately
    Fatal,
}

/// Classify an I/O error for the retry loop
pub fn classify(err: &io::Error) -> Failure {
    // On Windows, sharing/lock violations and bad names come as raw OS codes.
    #[cfg(windows)]
    {
        match err.raw_os_error() {
            // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
            Some(32) | Some(33) => return Failure::Transient,
            // ERROR_INVALID_NAME / ERROR_BAD_PATHNAME
            Some(123) | Some(161) => return Failure::Fatal,
            _ => {}
        }
    }

    match err.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::Unsupported => {
            Failure::Fatal
        }
        _ => Failure::Transient,
    }
}

/// Attempt bound and fixed delay
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            cancel: None,
        }
    }

    /// Stop retrying once `flag` is set
    ///
    /// Checked before each attempt and while waiting, so a cancelled
    /// operation returns within one poll interval.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run `op` until it succeeds, fails fatally, or attempts run out
    ///
    /// Blocks the calling thread for `delay` between attempts.
    pub fn run<F>(&self, path: &Path, mut op: F) -> Result<bool>
    where
        F: FnMut() -> io::Result<()>,
    {
        let attempts = self.attempts();
        for attempt in 1..=attempts {
            if self.is_cancelled() {
                return Ok(false);
            }
            match op() {
                Ok(()) => return Ok(true),
                Err(e) => self.on_failure(path, attempt, e)?,
            }
            if attempt < attempts {
                self.wait();
            }
        }
        self.give_up(path);
        Ok(false)
    }

    /// Same contract as [`run`](Self::run), waiting with `tokio::time::sleep`
    pub async fn run_async<F, Fut>(&self, path: &Path, mut op: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        let attempts = self.attempts();
        for attempt in 1..=attempts {
            if self.is_cancelled() {
                return Ok(false);
            }
            match op().await {
                Ok(()) => return Ok(true),
                Err(e) => self.on_failure(path, attempt, e)?,
            }
            if attempt < attempts {
                self.wait_async().await;
            }
        }
        self.give_up(path);
        Ok(false)
    }

    fn on_failure(&self, path: &Path, attempt: u32, err: io::Error) -> Result<()> {
        match classify(&err) {
            Failure::Fatal => Err(LogError::Io {
                path: path.to_path_buf(),
                source: err,
            }),
            Failure::Transient => {
                debug!(
                    path = %path.display(),
                    attempt,
                    error = %err,
                    "transient file failure"
                );
                Ok(())
            }
        }
    }

    fn give_up(&self, path: &Path) {
        if !self.is_cancelled() {
            warn!(
                path = %path.display(),
                attempts = self.attempts(),
                "file operation failed after retries"
            );
        }
    }

    fn wait(&self) {
        if self.cancel.is_none() {
            std::thread::sleep(self.delay);
            return;
        }
        let deadline = Instant::now() + self.delay;
        let slice = Duration::from_millis(CANCEL_POLL_INTERVAL_MS);
        while !self.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(slice.min(deadline - now));
        }
    }

    async fn wait_async(&self) {
        if self.cancel.is_none() {
            tokio::time::sleep(self.delay).await;
            return;
        }
        let deadline = Instant::now() + self.delay;
        let slice = Duration::from_millis(CANCEL_POLL_INTERVAL_MS);
        while !self.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(slice.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(10))
    }

    fn locked() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "locked")
    }

    #[test]
    fn test_default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_always_failing_op_attempted_max_times() {
        let calls = Cell::new(0);
        let started = Instant::now();

        let result = quick(5).run(Path::new("/tmp/x"), || {
            calls.set(calls.get() + 1);
            Err(locked())
        });

        assert!(matches!(result, Ok(false)));
        assert_eq!(calls.get(), 5);
        // Four waits separate five attempts.
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_success_after_transient_failures() {
        let calls = Cell::new(0);
        let result = quick(5).run(Path::new("/tmp/x"), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(io::Error::new(io::ErrorKind::WouldBlock, "busy"))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Ok(true)));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_fatal_error_propagates_without_retry() {
        let calls = Cell::new(0);
        let result = quick(5).run(Path::new("/tmp/x"), || {
            calls.set(calls.get() + 1);
            Err(io::Error::new(io::ErrorKind::InvalidInput, "bad path"))
        });
        assert!(matches!(result, Err(LogError::Io { .. })));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_attempts_runs_once() {
        let calls = Cell::new(0);
        let _ = quick(0).run(Path::new("/tmp/x"), || {
            calls.set(calls.get() + 1);
            Err(locked())
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_cancel_stops_retrying() {
        let flag = Arc::new(AtomicBool::new(false));
        let policy = RetryPolicy::new(5, Duration::from_secs(10)).with_cancel(flag.clone());
        let calls = Cell::new(0);
        let started = Instant::now();

        let result = policy.run(Path::new("/tmp/x"), || {
            calls.set(calls.get() + 1);
            flag.store(true, Ordering::SeqCst);
            Err(locked())
        });

        assert!(matches!(result, Ok(false)));
        assert_eq!(calls.get(), 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&locked()), Failure::Transient);
        assert_eq!(
            classify(&io::Error::new(io::ErrorKind::NotFound, "gone")),
            Failure::Transient
        );
        assert_eq!(
            classify(&io::Error::new(io::ErrorKind::Unsupported, "nope")),
            Failure::Fatal
        );
    }

    #[tokio::test]
    async fn test_async_retry_bound() {
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let counter = calls.clone();

        let result = quick(3)
            .run_async(Path::new("/tmp/x"), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(locked())
                }
            })
            .await;

        assert!(matches!(result, Ok(false)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
