//! Settings file management

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

use crate::errors::DashboardError;
use crate::filesys::file::File;
use crate::logs::{level_name, parse_level};
use crate::models::app::LifecycleAction;

/// Default settings file location
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/dokku-dashboard/settings.json";

/// Prefix of environment variables overriding the settings file
pub const ENV_PREFIX: &str = "DASHBOARD_";

/// How the dashboard reaches the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceMode {
    /// Local when the control socket exists, remote otherwise
    #[default]
    Auto,
    Local,
    Remote,
}

impl std::str::FromStr for DataSourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(DataSourceMode::Auto),
            "local" => Ok(DataSourceMode::Local),
            "remote" | "ssh" => Ok(DataSourceMode::Remote),
            _ => Err(format!("Invalid data source: {}", s)),
        }
    }
}

/// Dashboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default = "default_log_level", with = "level_name")]
    pub log_level: Level,

    /// Forces debug logging
    #[serde(default)]
    pub debug: bool,

    /// Directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    #[serde(default)]
    pub data_source: DataSourceMode,

    #[serde(default)]
    pub ssh: SshSettings,

    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub timeouts: TimeoutSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            debug: false,
            log_dir: None,
            json_logs: false,
            data_source: DataSourceMode::Auto,
            ssh: SshSettings::default(),
            paths: PathSettings::default(),
            timeouts: TimeoutSettings::default(),
        }
    }
}

impl Settings {
    /// Load from `path` (defaults when the file is missing), then apply
    /// `DASHBOARD_*` overrides from the process environment
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let file = File::new(path.as_ref());
        let mut settings = if file.exists().await {
            info!("Loading settings from {}", file.path().display());
            file.read_json::<Settings>().await?
        } else {
            debug!("No settings file at {}, using defaults", file.path().display());
            Settings::default()
        };
        settings.apply_env_overrides(std::env::vars())?;
        Ok(settings)
    }

    /// Apply `DASHBOARD_*` variables from `vars`
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> Result<(), DashboardError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "DOKKU_HOST" => self.ssh.host = value,
                "DOKKU_USER" => self.ssh.user = value,
                "DOKKU_SSH_KEY" => self.ssh.key_path = PathBuf::from(value),
                "DOKKU_PORT" => {
                    self.ssh.port = value.parse().map_err(|_| {
                        DashboardError::ConfigError(format!("Invalid {}: {}", name, value))
                    })?
                }
                "DATA_SOURCE" => {
                    self.data_source = value.parse().map_err(DashboardError::ConfigError)?
                }
                "LOG_LEVEL" => self.log_level = parse_level(&value)?,
                "LOG_DIR" => self.log_dir = Some(PathBuf::from(value)),
                "DEBUG" => self.debug = parse_bool(&value),
                _ => debug!("Ignoring unknown setting {}", name),
            }
        }
        Ok(())
    }

    /// Level after the debug switch
    pub fn effective_log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else {
            self.log_level
        }
    }
}

fn default_log_level() -> Level {
    Level::INFO
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Remote host access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshSettings {
    /// Empty disables the remote path
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_ssh_user")]
    pub user: String,

    #[serde(default = "default_ssh_port")]
    pub port: u16,

    #[serde(default = "default_ssh_key")]
    pub key_path: PathBuf,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// `StrictHostKeyChecking` policy
    #[serde(default = "default_host_key_checking")]
    pub host_key_checking: String,
}

fn default_ssh_user() -> String {
    "dokku".to_string()
}

fn default_ssh_port() -> u16 {
    22
}

fn default_ssh_key() -> PathBuf {
    PathBuf::from("/root/.ssh/id_rsa")
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_host_key_checking() -> String {
    "accept-new".to_string()
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: default_ssh_user(),
            port: default_ssh_port(),
            key_path: default_ssh_key(),
            connect_timeout_secs: default_connect_timeout(),
            host_key_checking: default_host_key_checking(),
        }
    }
}

/// Well-known host paths and tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_dokku_root")]
    pub dokku_root: PathBuf,

    #[serde(default = "default_services_root")]
    pub services_root: PathBuf,

    /// Existence of this socket selects the local path in `auto` mode
    #[serde(default = "default_control_socket")]
    pub control_socket: PathBuf,

    #[serde(default = "default_dokku_bin")]
    pub dokku_bin: String,

    #[serde(default = "default_docker_bin")]
    pub docker_bin: String,
}

fn default_dokku_root() -> PathBuf {
    PathBuf::from("/home/dokku")
}

fn default_services_root() -> PathBuf {
    PathBuf::from("/var/lib/dokku/services")
}

fn default_control_socket() -> PathBuf {
    PathBuf::from("/var/run/docker.sock")
}

fn default_dokku_bin() -> String {
    "dokku".to_string()
}

fn default_docker_bin() -> String {
    "docker".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            dokku_root: default_dokku_root(),
            services_root: default_services_root(),
            control_socket: default_control_socket(),
            dokku_bin: default_dokku_bin(),
            docker_bin: default_docker_bin(),
        }
    }
}

/// Command deadlines in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSettings {
    #[serde(default = "default_command_timeout")]
    pub command_secs: u64,

    /// Per-app queries while listing
    #[serde(default = "default_list_item_timeout")]
    pub list_item_secs: u64,

    #[serde(default = "default_start_stop_timeout")]
    pub start_stop_secs: u64,

    #[serde(default = "default_restart_timeout")]
    pub restart_secs: u64,

    #[serde(default = "default_rebuild_timeout")]
    pub rebuild_secs: u64,

    /// Config edits may restart the app
    #[serde(default = "default_config_timeout")]
    pub config_secs: u64,
}

fn default_command_timeout() -> u64 {
    30
}

fn default_list_item_timeout() -> u64 {
    5
}

fn default_start_stop_timeout() -> u64 {
    60
}

fn default_restart_timeout() -> u64 {
    120
}

fn default_rebuild_timeout() -> u64 {
    300
}

fn default_config_timeout() -> u64 {
    120
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            command_secs: default_command_timeout(),
            list_item_secs: default_list_item_timeout(),
            start_stop_secs: default_start_stop_timeout(),
            restart_secs: default_restart_timeout(),
            rebuild_secs: default_rebuild_timeout(),
            config_secs: default_config_timeout(),
        }
    }
}

impl TimeoutSettings {
    pub fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    pub fn list_item(&self) -> Duration {
        Duration::from_secs(self.list_item_secs)
    }

    pub fn config(&self) -> Duration {
        Duration::from_secs(self.config_secs)
    }

    pub fn for_action(&self, action: LifecycleAction) -> Duration {
        let secs = match action {
            LifecycleAction::Start | LifecycleAction::Stop => self.start_stop_secs,
            LifecycleAction::Restart => self.restart_secs,
            LifecycleAction::Rebuild => self.rebuild_secs,
        };
        Duration::from_secs(secs)
    }
}
