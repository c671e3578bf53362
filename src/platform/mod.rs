//! Platform abstraction layer
//!
//! Centralizes all platform-specific decisions (Windows vs POSIX-style).
//! Callers receive a `Platform` value and never branch on `cfg` themselves.
//!
//! # Usage
//!
//! ```ignore
//! use observer_log::platform::Platform;
//!
//! let platform = Platform::current();
//! let path = observer_log::logging::path::resolve(None, "NodeObserver", platform);
//! ```

#[cfg(windows)]
mod windows;

use crate::constants::FALLBACK_SYSTEM_DRIVE;

/// Path semantics of the running platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Drive-letter paths (`C:/...`)
    Windows {
        /// Letter of the system volume
        system_drive: char,
    },
    /// POSIX-style paths (`/...`)
    Posix,
}

impl Platform {
    /// Detect the running platform
    ///
    /// - Windows: reads the system volume from `SystemDrive`/`SystemRoot`
    /// - Other platforms: `Posix`
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows {
                system_drive: system_drive(),
            }
        } else {
            Self::Posix
        }
    }

    /// Windows platform with the fallback system drive (`C`)
    pub fn windows() -> Self {
        Self::Windows {
            system_drive: FALLBACK_SYSTEM_DRIVE,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows { .. })
    }
}

/// Letter of the current system volume
///
/// Falls back to `C` when neither `SystemDrive` nor `SystemRoot` carries one.
pub fn system_drive() -> char {
    ["SystemDrive", "SystemRoot"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| drive_letter(&value))
        .unwrap_or(FALLBACK_SYSTEM_DRIVE)
        .to_ascii_uppercase()
}

/// Drive letter of a `X:` prefixed string
pub(crate) fn drive_letter(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => Some(letter),
        _ => None,
    }
}

/// Number of enabled firewall rules
///
/// - Windows: queries the NetSecurity provider
/// - Other platforms: `None` (not implemented)
pub fn enabled_firewall_rule_count() -> Option<u32> {
    #[cfg(windows)]
    {
        windows::enabled_firewall_rule_count()
    }
    #[cfg(not(windows))]
    {
        None
    }
}
