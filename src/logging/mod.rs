//! Per-observer diagnostic logging
//!
//! Centralizes all channel-related types and utilities:
//! - `path` - Platform-correct log file locations
//! - `ChannelRegistry` - Process-wide, register-once channel targets
//! - `Channel` - Leveled writes with per-handle verbosity
//! - `file` - Rolling file targets (daily + size archives)

pub mod channel;
pub mod entry;
pub mod file;
pub mod path;
pub mod registry;

pub use channel::Channel;
pub use entry::{Level, LogRecord};
pub use registry::{ChannelRegistry, RegistrySettings};

/// Initialize internal tracing for the subsystem's own diagnostics
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(tracing_subscriber::EnvFilter::new(level))
        .try_init();
}

/// Trace line with an observer tag: `channel_trace!(ch, "NodeObserver", "cpu {}", pct)`
#[macro_export]
macro_rules! channel_trace {
    ($channel:expr, $observer:expr, $($arg:tt)*) => {
        $channel.trace($observer, format_args!($($arg)*))
    };
}

/// Info line, dropped unless the channel is verbose
#[macro_export]
macro_rules! channel_info {
    ($channel:expr, $($arg:tt)*) => {
        $channel.info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! channel_warn {
    ($channel:expr, $($arg:tt)*) => {
        $channel.warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! channel_error {
    ($channel:expr, $($arg:tt)*) => {
        $channel.error(format_args!($($arg)*))
    };
}
