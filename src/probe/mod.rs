//! Value-producing collaborators whose results observers log or publish
//!
//! Probes never fail: every parse or query problem collapses into a
//! sentinel value (`-1`, `(-1, -1)`, or an empty cluster id).

pub mod network;
pub mod telemetry;

pub use network::{active_firewall_rule_count, application_port_range, UNAVAILABLE_PORT_RANGE};
pub use telemetry::{ClusterIdentity, ClusterIdentitySource, TelemetryData};
