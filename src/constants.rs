//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Paths
// =============================================================================

/// Folder name of the default log root on both platforms
pub const DEFAULT_LOG_FOLDER: &str = "observer_logs";

/// Default log root on POSIX-style platforms
pub const DEFAULT_POSIX_LOG_ROOT: &str = "/tmp/observer_logs";

/// System drive used when the environment does not report one
pub const FALLBACK_SYSTEM_DRIVE: char = 'C';

/// Extension of active and archived channel files
pub const LOG_FILE_EXTENSION: &str = "log";

// =============================================================================
// Line layout
// =============================================================================

/// Separator between timestamp, level and message
pub const FIELD_SEPARATOR: &str = "--";

/// Separator between the observer tag and a trace message
pub const TRACE_TAG_SEPARATOR: char = '|';

/// Timestamp layout up to whole seconds (UTC)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ten-thousandths of a second appended after the seconds
pub const TIMESTAMP_FRACTION_DIGITS: usize = 4;

/// Date layout used in archive file names
pub const ARCHIVE_DATE_FORMAT: &str = "%Y%m%d";

// =============================================================================
// Retry
// =============================================================================

/// Attempts made by a file write/delete before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Fixed delay between attempts (milliseconds)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Granularity of cancellable retry waits (milliseconds)
pub const CANCEL_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// Sink
// =============================================================================

/// Records buffered per target before writers block
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Interval between background flushes (milliseconds)
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 250;

/// Size at which the active file is archived (bytes)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Smallest accepted size bound (bytes)
pub const MIN_FILE_BYTES: u64 = 1024;

/// How long flush requests wait for the writer thread (seconds)
pub const WRITER_ACK_TIMEOUT_SECS: u64 = 5;
