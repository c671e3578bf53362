//! observer-log - inspect and drive observer log channels
//!
//! Usage:
//!   observer-log resolve NodeObserver --platform windows
//!   observer-log log NodeObserver warn "disk queue length 12"
//!   observer-log write-file /tmp/report.txt "content"
//!   observer-log delete-file /tmp/report.txt
//!   observer-log port-range FrontEnd ClusterManifest.xml
//!   observer-log firewall-rules

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use observer_log::config::{self, Config};
use observer_log::logging::{self, path};
use observer_log::probe::network;
use observer_log::{ChannelRegistry, Level, Platform, RegistrySettings};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => Config::default(),
    };

    let result = run(cli.command, &config);
    observer_log::shutdown_all();
    result
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Resolve {
            channel,
            base_path,
            platform,
        } => {
            path::validate_channel_name(&channel)?;
            let platform = platform.map_or_else(Platform::current, |p| p.platform());
            let base = base_path.or_else(|| config.logs.base_path.clone());
            println!("{}", path::resolve(base.as_deref(), &channel, platform).display());
        }

        Command::Log {
            channel,
            level,
            message,
            observer,
            base_path,
        } => {
            ChannelRegistry::install_global(RegistrySettings::from(config));
            let handle = observer_log::get_or_create_channel(&channel, base_path.as_deref())?;
            // An explicit request from the command line is always written.
            handle.set_verbose(true);
            match level {
                Level::Trace => handle.trace(observer.as_deref().unwrap_or(&channel), &message),
                other => handle.log(other, &message),
            }
            println!("{}", handle.path().display());
        }

        Command::WriteFile { path, content } => {
            if !config.retry.policy().write_file(&path, &content)? {
                bail!("{} was not written", path.display());
            }
        }

        Command::DeleteFile { path } => {
            if !config.retry.policy().delete_file(&path)? {
                bail!("{} was not deleted", path.display());
            }
        }

        Command::PortRange {
            node_type,
            manifest,
        } => {
            let xml = std::fs::read_to_string(&manifest)
                .with_context(|| format!("cannot read {}", manifest.display()))?;
            let (low, high) = network::application_port_range(&node_type, &xml);
            println!("{} {}", low, high);
        }

        Command::FirewallRules => {
            println!("{}", network::active_firewall_rule_count());
        }
    }
    Ok(())
}
