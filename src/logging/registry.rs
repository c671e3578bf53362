//! Process-wide channel registry and lifecycle control
//!
//! The registry owns one `FileTarget` per channel name. Registration is the
//! only operation that takes the registry lock; the lock covers the
//! check-then-register sequence and nothing else (no I/O waits, no retries).
//!
//! Lifecycle: `Unregistered -> Registered -> ShutDown`. After
//! `shutdown_all` every target is closed and no new channel can be created.

use super::channel::Channel;
use super::file::{FileTarget, TargetConfig};
use super::path::{resolve, validate_channel_name};
use crate::config::Config;
use crate::error::{LogError, Result};
use crate::platform::Platform;
use crate::retry::RetryPolicy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;

/// Settings applied to every channel a registry creates
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Base directory used when a caller passes no override
    pub base_path: Option<String>,
    pub platform: Platform,
    pub verbose: bool,
    pub daily: bool,
    pub max_bytes: u64,
    pub max_archives: usize,
    pub flush_interval: Duration,
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RegistrySettings {
    fn from(config: &Config) -> Self {
        Self {
            base_path: config.logs.base_path.clone(),
            platform: Platform::current(),
            verbose: config.logs.verbose,
            daily: config.archive.daily,
            max_bytes: config.archive.max_bytes,
            max_archives: config.archive.max_archives,
            flush_interval: Duration::from_millis(config.logs.flush_interval_ms),
            queue_capacity: config.logs.queue_capacity,
            retry: config.retry.policy(),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    targets: HashMap<String, Arc<FileTarget>>,
    closed: bool,
}

pub struct ChannelRegistry {
    settings: RegistrySettings,
    state: Mutex<RegistryState>,
}

static GLOBAL: OnceLock<ChannelRegistry> = OnceLock::new();

/// Routing identifier of a channel's target
pub fn target_id(channel: &str) -> String {
    format!("{}LogFile", channel)
}

impl ChannelRegistry {
    pub fn new(settings: RegistrySettings) -> Self {
        Self {
            settings,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// The process-wide registry
    ///
    /// Created with default settings on first use unless
    /// [`install_global`](Self::install_global) ran before.
    pub fn global() -> &'static ChannelRegistry {
        GLOBAL.get_or_init(|| ChannelRegistry::new(RegistrySettings::default()))
    }

    /// Configure the process-wide registry
    ///
    /// Returns false when it was already initialized (settings unchanged).
    pub fn install_global(settings: RegistrySettings) -> bool {
        GLOBAL.set(ChannelRegistry::new(settings)).is_ok()
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Return a handle for `name`, registering its target on first use
    ///
    /// A later call with the same name reuses the existing target (and its
    /// path) whatever `base_override` it passes.
    pub fn get_or_create_channel(
        &self,
        name: &str,
        base_override: Option<&str>,
    ) -> Result<Channel> {
        validate_channel_name(name)?;

        let target = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(LogError::RegistryClosed);
            }
            match state.targets.get(name) {
                Some(target) => target.clone(),
                None => {
                    let cfg = self.target_config(name, base_override);
                    let target = FileTarget::spawn(name, cfg)?;
                    state.targets.insert(name.to_string(), target.clone());
                    debug!(
                        channel = name,
                        path = %target.path().display(),
                        "registered log channel"
                    );
                    target
                }
            }
        };

        Ok(Channel::new(
            target,
            target_id(name),
            self.settings.verbose,
            self.settings.retry.clone(),
        ))
    }

    fn target_config(&self, name: &str, base_override: Option<&str>) -> TargetConfig {
        let base = base_override.or(self.settings.base_path.as_deref());
        TargetConfig {
            path: resolve(base, name, self.settings.platform),
            daily: self.settings.daily,
            max_bytes: self.settings.max_bytes,
            max_archives: self.settings.max_archives,
            flush_interval: self.settings.flush_interval,
            queue_capacity: self.settings.queue_capacity,
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.state.lock().targets.contains_key(name)
    }

    /// Number of registered targets
    pub fn len(&self) -> usize {
        self.state.lock().targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().closed
    }

    fn snapshot(&self) -> Vec<Arc<FileTarget>> {
        self.state.lock().targets.values().cloned().collect()
    }

    /// Commit every target's queued lines
    ///
    /// Returns false if any target did not confirm. No effect after shutdown.
    pub fn flush_all(&self) -> bool {
        self.snapshot()
            .iter()
            .fold(true, |ok, target| target.flush() && ok)
    }

    /// Flush and close every target; terminal
    ///
    /// Writes through existing channels are silently dropped afterwards.
    /// Calling it again has no effect.
    pub fn shutdown_all(&self) {
        let targets = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.targets.values().cloned().collect::<Vec<_>>()
        };

        for target in &targets {
            target.close();
        }
        debug!(targets = targets.len(), "log registry shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn registry(dir: &Path) -> ChannelRegistry {
        ChannelRegistry::new(RegistrySettings {
            base_path: Some(dir.to_string_lossy().to_string()),
            platform: Platform::Posix,
            flush_interval: Duration::from_millis(20),
            retry: RetryPolicy::new(2, Duration::from_millis(5)),
            ..RegistrySettings::default()
        })
    }

    #[test]
    fn test_registration_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry(tmp.path());

        let first = reg.get_or_create_channel("NodeObserver", None).unwrap();
        let second = reg
            .get_or_create_channel("NodeObserver", Some("/elsewhere"))
            .unwrap();

        assert_eq!(reg.len(), 1);
        assert!(first.shares_target_with(&second));
        assert_eq!(first.path(), second.path());
        assert_eq!(first.target_id(), "NodeObserverLogFile");
    }

    #[test]
    fn test_channels_get_sibling_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry(tmp.path());

        let node = reg.get_or_create_channel("NodeObserver", None).unwrap();
        let disk = reg.get_or_create_channel("DiskObserver", None).unwrap();

        assert!(!node.shares_target_with(&disk));
        let root = |ch: &Channel| {
            ch.path()
                .parent()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
        };
        assert_eq!(root(&node), root(&disk));
        assert!(node.path().ends_with("NodeObserver/NodeObserver.log"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_override_wins_over_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry(tmp.path());
        let other = tmp.path().join("other");

        let ch = reg
            .get_or_create_channel("CertObserver", Some(other.to_str().unwrap()))
            .unwrap();
        assert!(ch.path().starts_with(&other));
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry(tmp.path());

        assert!(matches!(
            reg.get_or_create_channel("../escape", None),
            Err(LogError::InvalidChannelName { .. })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_verbosity_is_per_handle() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry(tmp.path());

        let a = reg.get_or_create_channel("Shared", None).unwrap();
        let b = reg.get_or_create_channel("Shared", None).unwrap();
        a.set_verbose(true);

        a.info("from a");
        b.info("from b");
        assert!(reg.flush_all());

        let content = fs::read_to_string(a.path()).unwrap();
        assert!(content.contains("from a"));
        assert!(!content.contains("from b"));
    }

    #[test]
    fn test_shutdown_is_terminal_and_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry(tmp.path());
        let ch = reg.get_or_create_channel("NodeObserver", None).unwrap();

        ch.error("before");
        reg.shutdown_all();
        assert!(reg.is_shut_down());

        let content = fs::read_to_string(ch.path()).unwrap();
        assert!(content.contains("before"));

        ch.error("after");
        reg.shutdown_all();
        assert!(!ch.flush());
        assert_eq!(fs::read_to_string(ch.path()).unwrap(), content);

        assert!(matches!(
            reg.get_or_create_channel("NodeObserver", None),
            Err(LogError::RegistryClosed)
        ));
    }
}
