//! Structured snapshots extracted from per-app reports

use serde::{Deserialize, Serialize};

/// Networking configuration of an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub attach_post_create: Vec<String>,
    pub attach_post_deploy: Vec<String>,
    pub bind_all_interfaces: bool,
    pub initial_network: String,
    pub static_web_listener: String,
    pub tld: String,
    /// `ip:port` pairs of the running web containers
    pub web_listeners: Vec<String>,
    pub port_mappings: Vec<PortMapping>,
}

/// One `scheme:host:container` port map entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub scheme: String,
    pub host_port: u16,
    pub container_port: u16,
}

/// When a mount is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountPhase {
    Build,
    Deploy,
    Run,
}

/// A bind mount, merged across phases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMount {
    pub host_path: String,
    pub container_path: String,
    pub options: Option<String>,
    pub phases: Vec<MountPhase>,
}

/// Zero-downtime check settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// Process types with checks disabled (`_all_` for every type)
    pub disabled: Vec<String>,
    /// Process types with checks skipped
    pub skipped: Vec<String>,
    pub wait_to_retire_secs: Option<u32>,
}

impl HealthCheckConfig {
    pub fn all_disabled(&self) -> bool {
        self.disabled.iter().any(|p| p == "_all_")
    }

    pub fn all_skipped(&self) -> bool {
        self.skipped.iter().any(|p| p == "_all_")
    }
}
