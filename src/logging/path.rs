//! Log file path resolution
//!
//! The only place where machine-dependent path semantics are decided.
//! Pure functions of (base path override, platform, channel name), no I/O.
//!
//! Resolved paths always use `/` separators, which Windows accepts as well,
//! so the result is identical no matter which host computes it.

use crate::constants::{DEFAULT_LOG_FOLDER, DEFAULT_POSIX_LOG_ROOT, LOG_FILE_EXTENSION};
use crate::error::{LogError, Result};
use crate::platform::{drive_letter, Platform};
use std::path::PathBuf;

/// Compute the log root directory for a platform
///
/// - No override: `<drive>:/observer_logs` (Windows) or `/tmp/observer_logs` (POSIX)
/// - Windows override without a drive prefix gets the system drive prepended
/// - POSIX override with a drive prefix gets it stripped
///
/// Empty overrides count as absent. The root is returned without a trailing separator.
pub fn resolve_root(base_override: Option<&str>, platform: Platform) -> String {
    let base = base_override
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.replace('\\', "/"));

    let root = match (base, platform) {
        (None, Platform::Windows { system_drive }) => {
            format!("{}:/{}", system_drive, DEFAULT_LOG_FOLDER)
        }
        (None, Platform::Posix) => DEFAULT_POSIX_LOG_ROOT.to_string(),
        (Some(base), Platform::Windows { system_drive }) => {
            if drive_letter(&base).is_some() {
                base
            } else if base.starts_with('/') {
                format!("{}:{}", system_drive, base)
            } else {
                format!("{}:/{}", system_drive, base)
            }
        }
        (Some(base), Platform::Posix) => match drive_letter(&base) {
            Some(_) => {
                let rest = &base[2..];
                if rest.starts_with('/') {
                    rest.to_string()
                } else {
                    format!("/{}", rest)
                }
            }
            None => base,
        },
    };

    trim_trailing_separators(root)
}

/// Compute the absolute log file path for a channel
///
/// Layout: `<root>/<channel>/<channel>.log`
pub fn resolve(base_override: Option<&str>, channel: &str, platform: Platform) -> PathBuf {
    let root = resolve_root(base_override, platform);
    PathBuf::from(format!(
        "{}/{}/{}.{}",
        root, channel, channel, LOG_FILE_EXTENSION
    ))
}

/// Check that a channel name can be used as a folder and file name
pub fn validate_channel_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.contains(|c: char| c == '\0' || c.is_control()) {
        Some("name contains control characters")
    } else if name.contains([':', '*', '?', '"', '<', '>', '|']) {
        Some("name contains reserved characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(LogError::InvalidChannelName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

// A bare `/` becomes the empty root and `C:/` becomes `C:`; `resolve` re-adds the separator.
fn trim_trailing_separators(mut root: String) -> String {
    while root.ends_with('/') {
        root.pop();
    }
    root
}
