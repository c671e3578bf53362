//! Health telemetry record
//!
//! Serializable description of one health finding. Transport of the record
//! is handled elsewhere; here it is built, serialized and optionally
//! written to a log channel.

use crate::logging::{Channel, Level};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of the cluster the agent runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIdentity {
    pub cluster_id: String,
    pub tenant_id: Option<String>,
    pub cluster_type: Option<String>,
}

/// Cluster client lookup (external collaborator)
///
/// Implementations swallow their own failures and return `None`.
pub trait ClusterIdentitySource {
    fn cluster_identity(&self) -> Option<ClusterIdentity>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TelemetryData {
    pub application_name: Option<String>,
    pub cluster_id: String,
    pub code: Option<String>,
    pub health_event_description: Option<String>,
    pub health_scope: String,
    pub health_state: Option<String>,
    pub metric: Option<String>,
    pub node_name: Option<String>,
    pub node_status: Option<String>,
    pub observer_name: Option<String>,
    pub partition: Option<String>,
    pub replica: i64,
    pub service_name: Option<String>,
    pub source: String,
    pub value: Value,
}

impl Default for TelemetryData {
    fn default() -> Self {
        Self {
            application_name: None,
            cluster_id: String::new(),
            code: None,
            health_event_description: None,
            health_scope: "Cluster".to_string(),
            health_state: None,
            metric: None,
            node_name: None,
            node_status: None,
            observer_name: None,
            partition: None,
            replica: 0,
            service_name: None,
            source: "ClusterObserver".to_string(),
            value: Value::Null,
        }
    }
}

impl TelemetryData {
    /// New record stamped with the cluster id (empty when the lookup fails)
    pub fn new(identity: &dyn ClusterIdentitySource) -> Self {
        Self {
            cluster_id: identity
                .cluster_identity()
                .map(|id| id.cluster_id)
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Channel level matching the health state
    pub fn level(&self) -> Level {
        match self.health_state.as_deref() {
            Some(state) if state.eq_ignore_ascii_case("error") => Level::Error,
            Some(state) if state.eq_ignore_ascii_case("warning") => Level::Warn,
            _ => Level::Info,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Write the record as one JSON line to `channel`
    ///
    /// Healthy records are `info` lines and follow the channel's verbosity.
    pub fn log_to(&self, channel: &Channel) {
        match self.to_json() {
            Ok(json) => channel.log(self.level(), json),
            Err(e) => channel.error(format_args!("telemetry serialization failed: {}", e)),
        }
    }
}
