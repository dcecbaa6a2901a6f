//! Application models

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::certificate::SslStatus;
use crate::models::env_var::EnvironmentVariable;
use crate::models::report::{HealthCheckConfig, NetworkConfig, StorageMount};

/// Application lifecycle status as sampled from the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Running,
    Stopped,
    Crashed,
    Restarting,
    Starting,
    Stopping,
    #[default]
    Unknown,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Running => "running",
            ApplicationStatus::Stopped => "stopped",
            ApplicationStatus::Crashed => "crashed",
            ApplicationStatus::Restarting => "restarting",
            ApplicationStatus::Starting => "starting",
            ApplicationStatus::Stopping => "stopping",
            ApplicationStatus::Unknown => "unknown",
        }
    }

    /// Rank used when several containers report different states.
    ///
    /// Higher wins: restarting > starting > stopping > running > crashed >
    /// stopped > unknown.
    pub fn priority(&self) -> u8 {
        match self {
            ApplicationStatus::Restarting => 6,
            ApplicationStatus::Starting => 5,
            ApplicationStatus::Stopping => 4,
            ApplicationStatus::Running => 3,
            ApplicationStatus::Crashed => 2,
            ApplicationStatus::Stopped => 1,
            ApplicationStatus::Unknown => 0,
        }
    }

    /// Collapse per-container states into one application status
    pub fn aggregate<I>(states: I) -> ApplicationStatus
    where
        I: IntoIterator<Item = ApplicationStatus>,
    {
        states
            .into_iter()
            .max_by_key(|status| status.priority())
            .unwrap_or(ApplicationStatus::Unknown)
    }

    /// Map a container runtime state word (`running`, `exited`, ...) to a status.
    ///
    /// `exit_code` distinguishes a clean stop from a crash for exited containers.
    pub fn from_container_state(state: &str, exit_code: Option<i64>) -> ApplicationStatus {
        match state.trim().to_lowercase().as_str() {
            "running" | "up" => ApplicationStatus::Running,
            "restarting" => ApplicationStatus::Restarting,
            "created" | "starting" => ApplicationStatus::Starting,
            "removing" | "stopping" => ApplicationStatus::Stopping,
            "paused" | "stopped" => ApplicationStatus::Stopped,
            "exited" => match exit_code {
                Some(code) if code != 0 => ApplicationStatus::Crashed,
                _ => ApplicationStatus::Stopped,
            },
            "dead" | "crashed" => ApplicationStatus::Crashed,
            _ => ApplicationStatus::Unknown,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub status: ApplicationStatus,
    pub container_count: u32,
    /// Domain names, the first one is the primary domain
    pub domains: Vec<String>,
    pub deploy_source: String,
    /// `https://` + primary domain, empty without domains
    pub web_url: String,
}

impl Application {
    pub fn new(name: impl Into<String>, status: ApplicationStatus, domains: Vec<String>) -> Self {
        let web_url = web_url_for(&domains);
        Self {
            name: name.into(),
            status,
            container_count: 0,
            domains,
            deploy_source: String::new(),
            web_url,
        }
    }

    /// Placeholder for an application whose state could not be resolved
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(name, ApplicationStatus::Unknown, Vec::new())
    }

    pub fn with_container_count(mut self, count: u32) -> Self {
        self.container_count = count;
        self
    }

    pub fn with_deploy_source(mut self, source: impl Into<String>) -> Self {
        self.deploy_source = source.into();
        self
    }

    pub fn primary_domain(&self) -> Option<&str> {
        self.domains.first().map(String::as_str)
    }
}

fn web_url_for(domains: &[String]) -> String {
    domains
        .first()
        .map(|domain| format!("https://{}", domain))
        .unwrap_or_default()
}

/// Status and container count sampled in one query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub status: ApplicationStatus,
    pub container_count: u32,
}

/// Process type paired with its instance count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessScale {
    /// e.g. `web`, `worker`
    pub process_type: String,
    pub quantity: u32,
}

impl ProcessScale {
    pub fn new(process_type: impl Into<String>, quantity: u32) -> Self {
        Self {
            process_type: process_type.into(),
            quantity,
        }
    }
}

/// Everything the detail view shows for one application
#[derive(Debug, Clone, Serialize)]
pub struct AppDetail {
    pub app: Application,
    pub config: Vec<EnvironmentVariable>,
    pub scaling: Vec<ProcessScale>,
    pub network: NetworkConfig,
    pub storage: Vec<StorageMount>,
    pub ssl: SslStatus,
    pub health: HealthCheckConfig,
}

/// Lifecycle control actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Start,
    Stop,
    Restart,
    Rebuild,
}

impl LifecycleAction {
    /// The dokku subcommand issuing this action
    pub fn subcommand(&self) -> &'static str {
        match self {
            LifecycleAction::Start => "ps:start",
            LifecycleAction::Stop => "ps:stop",
            LifecycleAction::Restart => "ps:restart",
            LifecycleAction::Rebuild => "ps:rebuild",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Start => "start",
            LifecycleAction::Stop => "stop",
            LifecycleAction::Restart => "restart",
            LifecycleAction::Rebuild => "rebuild",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(LifecycleAction::Start),
            "stop" => Ok(LifecycleAction::Stop),
            "restart" => Ok(LifecycleAction::Restart),
            "rebuild" => Ok(LifecycleAction::Rebuild),
            _ => Err(format!("Invalid action: {}", s)),
        }
    }
}

/// Result of a control action: the command output and the re-resolved app
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub action: LifecycleAction,
    pub output: String,
    pub app: Application,
}
