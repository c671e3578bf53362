//! Resilient diagnostic logging for cluster health observers
//!
//! Each observer unit gets its own named channel backed by a rolling log
//! file under `<root>/<channel>/<channel>.log`. Channels are registered once
//! per process, writes never fail the caller, and file writes/deletes ride
//! out transient contention with a bounded retry.
//!
//! ```no_run
//! use observer_log::{channel_warn, get_or_create_channel, shutdown_all};
//!
//! let channel = get_or_create_channel("NodeObserver", None)?;
//! channel.set_verbose(true);
//! channel.info("observer started");
//! channel_warn!(channel, "disk {} at {}%", "C:", 91);
//! shutdown_all();
//! # Ok::<(), observer_log::LogError>(())
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod file_ops;
pub mod logging;
pub mod platform;
pub mod probe;
pub mod retry;

pub use error::{LogError, Result};
pub use file_ops::{delete_file, write_file};
pub use logging::{Channel, ChannelRegistry, Level, RegistrySettings};
pub use platform::Platform;
pub use retry::RetryPolicy;

/// Get or register a channel on the process-wide registry
pub fn get_or_create_channel(name: &str, base_override: Option<&str>) -> Result<Channel> {
    ChannelRegistry::global().get_or_create_channel(name, base_override)
}

/// Commit every channel's queued lines
pub fn flush_all() -> bool {
    ChannelRegistry::global().flush_all()
}

/// Flush and close every channel; call once at process teardown
pub fn shutdown_all() {
    ChannelRegistry::global().shutdown_all()
}
