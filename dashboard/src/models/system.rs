//! Host overview models

use serde::{Deserialize, Serialize};

/// Host resource usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostMetrics {
    /// CPU usage percentage (0-100)
    pub cpu_usage: f32,
    pub cpu_count: usize,
    pub memory_used: u64,
    pub memory_total: u64,
    pub memory_percent: f32,
    pub disk_used: u64,
    pub disk_total: u64,
    pub disk_percent: f32,
    pub uptime_secs: u64,
    pub hostname: String,
}

/// Platform overview.
///
/// Docker figures are `None` when the engine could not be asked, as over
/// ssh, so they are never confused with a real zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub dokku_version: String,
    pub docker_version: Option<String>,
    pub app_count: usize,
    pub container_count: Option<usize>,
    pub image_count: Option<usize>,
    pub volume_count: Option<usize>,
    /// Only available when running on the host itself
    pub host: Option<HostMetrics>,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            dokku_version: "unknown".to_string(),
            docker_version: None,
            app_count: 0,
            container_count: None,
            image_count: None,
            volume_count: None,
            host: None,
        }
    }
}

/// An installed platform plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub description: String,
}
