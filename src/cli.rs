//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand, ValueEnum};
use observer_log::{Level, Platform};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Observer log channels: resolve, write, and maintain log files
#[derive(Parser, Debug)]
#[command(name = "observer-log")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (TOML); defaults are used when omitted
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Path semantics to resolve for
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformArg {
    /// Drive-letter paths (system drive of this host, or C)
    Windows,
    /// POSIX-style paths
    Posix,
}

impl PlatformArg {
    pub fn platform(self) -> Platform {
        match self {
            Self::Windows => Platform::Windows {
                system_drive: observer_log::platform::system_drive(),
            },
            Self::Posix => Platform::Posix,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the log file path of a channel
    Resolve {
        channel: String,

        /// Base log directory (overrides config)
        #[arg(long, value_name = "DIR")]
        base_path: Option<String>,

        /// Resolve for another platform than the running one
        #[arg(long, value_enum)]
        platform: Option<PlatformArg>,
    },

    /// Append one line to a channel
    Log {
        channel: String,

        /// trace, info, warn or error
        level: Level,

        message: String,

        /// Observer tag of trace lines (defaults to the channel name)
        #[arg(long, value_name = "TAG")]
        observer: Option<String>,

        /// Base log directory (overrides config)
        #[arg(long, value_name = "DIR")]
        base_path: Option<String>,
    },

    /// Overwrite a file, retrying on contention
    WriteFile { path: PathBuf, content: String },

    /// Delete a file, retrying on contention
    DeleteFile { path: PathBuf },

    /// Print the application port range of a node type from a cluster manifest
    PortRange {
        node_type: String,

        /// Cluster manifest XML file
        manifest: PathBuf,
    },

    /// Print the number of enabled firewall rules (-1 if unavailable)
    FirewallRules,
}

// =============================================================================
// Tests
// =============================================================================
