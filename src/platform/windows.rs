//! Windows platform implementation
//!
//! Features:
//! - Enabled firewall rule count (NetSecurity PowerShell provider)

use std::process::Command;

/// Count enabled firewall rules
///
/// Any failure to run or parse the query yields `None`.
pub fn enabled_firewall_rule_count() -> Option<u32> {
    let output = Command::new("powershell")
        .args([
            "-NoProfile",
            "-NonInteractive",
            "-Command",
            "(Get-NetFirewallRule -Enabled True | Measure-Object).Count",
        ])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}
