//! Dashboard client facade
//!
//! [`DokkuClient`] exposes one method per dashboard operation and routes it
//! to the data source chosen at construction. Read methods always return
//! something (defaults for unknown apps or unreachable hosts); write
//! methods return `Result` so failures stay visible.

pub mod local;
pub mod remote;
pub mod selector;
pub mod source;
pub mod stream;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::command::{is_valid_app_name, validate_app_name, validate_env_key};
use crate::config::layout::HostLayout;
use crate::config::settings::{Settings, TimeoutSettings};
use crate::errors::DashboardError;
use crate::local::{DockerCli, DokkuCli, LocalStateReader};
use crate::models::app::{
    ActionOutcome, AppDetail, Application, ApplicationStatus, LifecycleAction, ProcessScale,
};
use crate::models::certificate::{SslCertificate, SslStatus};
use crate::models::env_var::EnvironmentVariable;
use crate::models::log_line::LogLine;
use crate::models::report::{HealthCheckConfig, NetworkConfig, StorageMount};
use crate::models::service::Service;
use crate::models::system::{Plugin, SystemInfo};
use crate::process::{ProcessRunner, TokioProcessRunner};
use crate::remote::{SshRunner, SshTarget};

pub use local::LocalSource;
pub use remote::RemoteSource;
pub use selector::SourceKind;
pub use source::DataSource;
pub use stream::LogStream;

/// Upper bound for a single log fetch
pub const MAX_LOG_LINES: u32 = 10_000;

/// Unified entry point for the dashboard
#[derive(Clone)]
pub struct DokkuClient {
    source: Arc<dyn DataSource>,
    timeouts: TimeoutSettings,
}

impl DokkuClient {
    pub fn new(source: Arc<dyn DataSource>, timeouts: TimeoutSettings) -> Self {
        Self { source, timeouts }
    }

    /// Pick the data path once and build the client for it.
    ///
    /// Fails when neither the local control socket nor a usable remote
    /// host is available.
    pub fn from_settings(settings: &Settings) -> Result<Self, DashboardError> {
        let kind = SourceKind::select(settings)?;
        Ok(Self::for_kind(settings, kind, Arc::new(TokioProcessRunner::new())))
    }

    /// Build the client for `kind`, spawning processes through `runner`
    pub fn for_kind(settings: &Settings, kind: SourceKind, runner: Arc<dyn ProcessRunner>) -> Self {
        let source: Arc<dyn DataSource> = match kind {
            SourceKind::Local => {
                let docker = DockerCli::new(
                    settings.paths.docker_bin.clone(),
                    runner.clone(),
                    settings.timeouts.command(),
                );
                let state = LocalStateReader::new(HostLayout::from_settings(&settings.paths), docker);
                let dokku = DokkuCli::new(settings.paths.dokku_bin.clone(), runner);
                Arc::new(LocalSource::new(state, dokku, settings.timeouts.clone()))
            }
            SourceKind::Remote => {
                let ssh = SshRunner::new(SshTarget::from_settings(&settings.ssh), runner);
                Arc::new(RemoteSource::new(ssh, settings.timeouts.clone()))
            }
        };
        Self::new(source, settings.timeouts.clone())
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// All apps sorted by name
    pub async fn list_apps(&self) -> Vec<Application> {
        let mut apps = self.source.list_apps().await;
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        apps
    }

    /// Status, container count, domains and deploy source of one app
    pub async fn app_info(&self, name: &str) -> Application {
        if !is_valid_app_name(name) {
            debug!("Invalid app name {:?}, returning unknown", name);
            return Application::unknown(name);
        }

        let (processes, domains, deploy_source) = tokio::join!(
            self.source.processes(name),
            self.source.domains(name),
            self.source.deploy_source(name)
        );

        Application::new(name, processes.status, domains)
            .with_container_count(processes.container_count)
            .with_deploy_source(deploy_source)
    }

    pub async fn app_status(&self, name: &str) -> ApplicationStatus {
        if !is_valid_app_name(name) {
            return ApplicationStatus::Unknown;
        }
        self.source.processes(name).await.status
    }

    /// Everything about one app, gathered concurrently
    pub async fn app_detail(&self, name: &str) -> AppDetail {
        let (app, config, scaling, network, storage, ssl, health) = tokio::join!(
            self.app_info(name),
            self.config_list(name),
            self.scaling(name),
            self.network(name),
            self.storage(name),
            self.ssl_status(name),
            self.health_checks(name)
        );

        AppDetail {
            app,
            config,
            scaling,
            network,
            storage,
            ssl,
            health,
        }
    }

    /// Run `action`, then re-resolve the app once the command has returned
    pub async fn control(
        &self,
        name: &str,
        action: LifecycleAction,
    ) -> Result<ActionOutcome, DashboardError> {
        validate_app_name(name)?;

        info!("{} {}", action, name);
        let output = self
            .source
            .control(name, action, self.timeouts.for_action(action))
            .await?;
        let app = self.app_info(name).await;

        Ok(ActionOutcome { action, output, app })
    }

    pub async fn start(&self, name: &str) -> Result<ActionOutcome, DashboardError> {
        self.control(name, LifecycleAction::Start).await
    }

    pub async fn stop(&self, name: &str) -> Result<ActionOutcome, DashboardError> {
        self.control(name, LifecycleAction::Stop).await
    }

    pub async fn restart(&self, name: &str) -> Result<ActionOutcome, DashboardError> {
        self.control(name, LifecycleAction::Restart).await
    }

    pub async fn rebuild(&self, name: &str) -> Result<ActionOutcome, DashboardError> {
        self.control(name, LifecycleAction::Rebuild).await
    }

    pub async fn config_list(&self, name: &str) -> Vec<EnvironmentVariable> {
        if !is_valid_app_name(name) {
            return Vec::new();
        }
        self.source.config(name).await
    }

    pub async fn config_set(
        &self,
        name: &str,
        key: &str,
        value: &str,
        restart: bool,
    ) -> Result<String, DashboardError> {
        validate_app_name(name)?;
        validate_env_key(key)?;
        self.source
            .config_set(name, key, value, restart, self.timeouts.config())
            .await
    }

    pub async fn config_unset(
        &self,
        name: &str,
        key: &str,
        restart: bool,
    ) -> Result<String, DashboardError> {
        validate_app_name(name)?;
        validate_env_key(key)?;
        self.source
            .config_unset(name, key, restart, self.timeouts.config())
            .await
    }

    /// Last `lines` log lines (clamped to 1..=[`MAX_LOG_LINES`])
    pub async fn logs_recent(&self, name: &str, lines: u32) -> Vec<LogLine> {
        if !is_valid_app_name(name) {
            return Vec::new();
        }
        let received_at = Utc::now();
        self.source
            .logs_recent(name, lines.clamp(1, MAX_LOG_LINES))
            .await
            .iter()
            .map(|raw| LogLine::parse(raw, received_at))
            .collect()
    }

    /// Follow the log until the returned stream is dropped
    pub async fn logs_stream(&self, name: &str, lines: u32) -> Result<LogStream, DashboardError> {
        validate_app_name(name)?;
        let lines = self
            .source
            .logs_stream(name, lines.clamp(1, MAX_LOG_LINES))
            .await?;
        Ok(LogStream::new(name, lines))
    }

    pub async fn scaling(&self, name: &str) -> Vec<ProcessScale> {
        if !is_valid_app_name(name) {
            return Vec::new();
        }
        self.source.scaling(name).await
    }

    pub async fn network(&self, name: &str) -> NetworkConfig {
        if !is_valid_app_name(name) {
            return NetworkConfig::default();
        }
        self.source.network(name).await
    }

    pub async fn storage(&self, name: &str) -> Vec<StorageMount> {
        if !is_valid_app_name(name) {
            return Vec::new();
        }
        self.source.storage(name).await
    }

    pub async fn ssl_status(&self, name: &str) -> SslStatus {
        if !is_valid_app_name(name) {
            return SslStatus::default();
        }
        self.source.ssl_status(name).await
    }

    pub async fn health_checks(&self, name: &str) -> HealthCheckConfig {
        if !is_valid_app_name(name) {
            return HealthCheckConfig::default();
        }
        self.source.health_checks(name).await
    }

    /// Certificates, soonest expiry first
    pub async fn certificates(&self) -> Vec<SslCertificate> {
        let mut certs = self.source.certificates().await;
        certs.sort_by(|a, b| {
            a.days_until_expiry
                .cmp(&b.days_until_expiry)
                .then_with(|| a.app_name.cmp(&b.app_name))
        });
        certs
    }

    pub async fn services(&self) -> Vec<Service> {
        self.source.services().await
    }

    pub async fn plugins(&self) -> Vec<Plugin> {
        self.source.plugins().await
    }

    pub async fn system_info(&self) -> SystemInfo {
        self.source.system_info().await
    }
}
