//! Networking probes
//!
//! - Application port range of a node type, from the cluster manifest
//! - Count of enabled firewall rules (Windows only)

use crate::platform;
use roxmltree::{Document, Node};

/// Namespace of cluster manifest elements
const FABRIC_NS: &str = "http://schemas.microsoft.com/2011/01/fabric";

/// Returned when the port range cannot be determined
pub const UNAVAILABLE_PORT_RANGE: (i32, i32) = (-1, -1);

/// Application endpoint port range `(low, high)` of `node_type`
///
/// Reads `NodeTypes/NodeType[@Name]/.../ApplicationEndpoints` from the
/// manifest. A missing bound is reported as `-1`; any other problem
/// (empty input, malformed XML, DTDs, unknown node type, non-numeric
/// ports) yields `(-1, -1)`.
pub fn application_port_range(node_type: &str, manifest_xml: &str) -> (i32, i32) {
    if node_type.is_empty() || manifest_xml.is_empty() {
        return UNAVAILABLE_PORT_RANGE;
    }
    parse_port_range(node_type, manifest_xml).unwrap_or(UNAVAILABLE_PORT_RANGE)
}

fn parse_port_range(node_type: &str, manifest_xml: &str) -> Option<(i32, i32)> {
    // Default parsing options reject DTDs, so no entity expansion happens.
    let doc = Document::parse(manifest_xml).ok()?;

    let endpoints = doc
        .descendants()
        .filter(|n| n.has_tag_name((FABRIC_NS, "NodeTypes")))
        .flat_map(|n| n.descendants())
        .filter(|n| {
            n.has_tag_name((FABRIC_NS, "NodeType")) && n.attribute("Name") == Some(node_type)
        })
        .flat_map(|n| n.descendants())
        .find(|n| n.has_tag_name((FABRIC_NS, "ApplicationEndpoints")))?;

    Some((port(&endpoints, "StartPort")?, port(&endpoints, "EndPort")?))
}

/// `-1` when absent, `None` when present but not a number
fn port(node: &Node, name: &str) -> Option<i32> {
    match node.attribute(name) {
        Some(value) => value.trim().parse().ok(),
        None => Some(-1),
    }
}

/// Number of enabled firewall rules, or `-1` when unsupported or unavailable
pub fn active_firewall_rule_count() -> i32 {
    platform::enabled_firewall_rule_count()
        .and_then(|count| i32::try_from(count).ok())
        .unwrap_or(-1)
}
