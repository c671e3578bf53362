//! Log record types
//!
//! Core types for representing one line written to a channel file.

use crate::constants::{FIELD_SEPARATOR, TIMESTAMP_FORMAT, TIMESTAMP_FRACTION_DIGITS};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

/// Severity of a channel message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Uppercase name used in the line layout
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown level '{}'", other)),
        }
    }
}

/// One formatted line, stamped when the channel accepted it
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub at: DateTime<Utc>,
    pub level: Level,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, message)
    }

    pub fn at(at: DateTime<Utc>, level: Level, message: impl Into<String>) -> Self {
        Self {
            at,
            level,
            message: message.into(),
        }
    }

    /// UTC day the record belongs to (drives daily archiving)
    #[inline]
    pub fn day(&self) -> NaiveDate {
        self.at.date_naive()
    }

    /// `<yyyy-MM-dd HH:mm:ss.ffff>--<LEVEL>--<message>` without a line terminator
    pub fn format_line(&self) -> String {
        let mut line = String::with_capacity(self.message.len() + 32);
        if self.write_line(&mut line).is_err() {
            // Never lose the message to a timestamp problem.
            line.clear();
            line.push_str(&self.at.to_rfc3339());
            line.push_str(FIELD_SEPARATOR);
            line.push_str(self.level.as_str());
            line.push_str(FIELD_SEPARATOR);
            line.push_str(&self.message);
        }
        line
    }

    fn write_line(&self, out: &mut String) -> fmt::Result {
        // Leap seconds report up to 1_999_999 micros.
        let fraction = (self.at.timestamp_subsec_micros() / 100).min(9_999);
        write!(
            out,
            "{}.{:0width$}{sep}{}{sep}{}",
            self.at.format(TIMESTAMP_FORMAT),
            fraction,
            self.level,
            self.message,
            width = TIMESTAMP_FRACTION_DIGITS,
            sep = FIELD_SEPARATOR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line_layout() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 7, 5, 9).unwrap();
        let record = LogRecord::at(at, Level::Warn, "disk queue length 12");
        assert_eq!(
            record.format_line(),
            "2026-10-18 07:05:09.0000--WARN--disk queue length 12"
        );
        assert_eq!(record.day(), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    }

    #[test]
    fn test_format_line_fraction_digits() {
        let base = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap();

        let at = base + chrono::Duration::microseconds(123_456);
        let line = LogRecord::at(at, Level::Error, "x").format_line();
        assert_eq!(line, "2026-10-18 23:59:59.1234--ERROR--x");

        let at = base + chrono::Duration::microseconds(999_999);
        let line = LogRecord::at(at, Level::Info, "y").format_line();
        assert_eq!(line, "2026-10-18 23:59:59.9999--INFO--y");

        let at = base + chrono::Duration::microseconds(700);
        let line = LogRecord::at(at, Level::Trace, "z").format_line();
        assert_eq!(line, "2026-10-18 23:59:59.0007--TRACE--z");
    }

    #[test]
    fn test_format_line_for_current_time() {
        let line = LogRecord::new(Level::Warn, "now").format_line();
        let (stamp, rest) = line.split_once(FIELD_SEPARATOR).unwrap();
        assert_eq!(rest, "WARN--now");
        assert_eq!(stamp.len(), "yyyy-MM-dd HH:mm:ss.ffff".len());
        assert_eq!(stamp.as_bytes()[19], b'.');
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("INFO".parse::<Level>(), Ok(Level::Info));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert!("fatal".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_names() {
        let names: Vec<_> = [Level::Trace, Level::Info, Level::Warn, Level::Error]
            .iter()
            .map(Level::to_string)
            .collect();
        assert_eq!(names, ["TRACE", "INFO", "WARN", "ERROR"]);
    }
}
