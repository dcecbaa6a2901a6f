//! Data source on the dokku host itself
//!
//! State that dokku keeps in plain files or docker labels is read directly;
//! everything else goes through the local `dokku` binary.

use std::time::Duration;

use async_trait::async_trait;

use crate::client::selector::SourceKind;
use crate::client::source::{recent_log_lines, report, write, DataSource};
use crate::command::DokkuCommand;
use crate::config::settings::TimeoutSettings;
use crate::errors::DashboardError;
use crate::local::{DokkuCli, LocalStateReader};
use crate::models::app::{Application, LifecycleAction, ProcessScale, ProcessSnapshot};
use crate::models::certificate::{SslCertificate, SslStatus};
use crate::models::env_var::EnvironmentVariable;
use crate::models::report::{HealthCheckConfig, NetworkConfig, StorageMount};
use crate::models::service::Service;
use crate::models::system::{Plugin, SystemInfo};
use crate::parsers;
use crate::process::LineStream;
use crate::telemetry;

pub struct LocalSource {
    state: LocalStateReader,
    dokku: DokkuCli,
    timeouts: TimeoutSettings,
    /// Sample host metrics for the system overview
    host_metrics: bool,
}

impl LocalSource {
    pub fn new(state: LocalStateReader, dokku: DokkuCli, timeouts: TimeoutSettings) -> Self {
        Self {
            state,
            dokku,
            timeouts,
            host_metrics: true,
        }
    }

    /// Skip sysinfo sampling in the system overview
    pub fn without_host_metrics(mut self) -> Self {
        self.host_metrics = false;
        self
    }

    pub fn state(&self) -> &LocalStateReader {
        &self.state
    }

    async fn report(&self, subcommand: &str, app: &str) -> String {
        report(&self.dokku, &DokkuCommand::for_app(subcommand, app), self.timeouts.command()).await
    }
}

#[async_trait]
impl DataSource for LocalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    async fn list_app_names(&self) -> Vec<String> {
        self.state.list_app_names().await
    }

    async fn list_apps(&self) -> Vec<Application> {
        let names = self.state.list_app_names().await;
        let snapshots = self.state.processes_for(&names).await;

        let mut apps = Vec::with_capacity(names.len());
        for name in names {
            let snapshot = snapshots.get(&name).copied().unwrap_or_default();
            let domains = self.state.domains(&name).await;
            apps.push(
                Application::new(name, snapshot.status, domains)
                    .with_container_count(snapshot.container_count),
            );
        }
        apps
    }

    async fn processes(&self, app: &str) -> ProcessSnapshot {
        self.state.processes(app).await
    }

    async fn domains(&self, app: &str) -> Vec<String> {
        self.state.domains(app).await
    }

    async fn deploy_source(&self, app: &str) -> String {
        parsers::apps::parse_deploy_source(&self.report("git:report", app).await)
    }

    async fn config(&self, app: &str) -> Vec<EnvironmentVariable> {
        self.state.env(app).await
    }

    /// `DOKKU_SCALE` first, `ps:scale` when the file has nothing
    async fn scaling(&self, app: &str) -> Vec<ProcessScale> {
        let scale = self.state.scale(app).await;
        if !scale.is_empty() {
            return scale;
        }
        parsers::apps::parse_scale(&self.report("ps:scale", app).await)
    }

    async fn network(&self, app: &str) -> NetworkConfig {
        let (network, ports) = tokio::join!(
            self.report("network:report", app),
            self.report("ports:report", app)
        );
        NetworkConfig {
            port_mappings: parsers::network::parse_port_map(&ports),
            ..parsers::network::parse_network(&network)
        }
    }

    async fn storage(&self, app: &str) -> Vec<StorageMount> {
        self.state.storage(app).await
    }

    async fn ssl_status(&self, app: &str) -> SslStatus {
        parsers::certs::parse_ssl_status(&self.report("certs:report", app).await)
    }

    async fn health_checks(&self, app: &str) -> HealthCheckConfig {
        parsers::checks::parse_checks(&self.report("checks:report", app).await)
    }

    async fn control(
        &self,
        app: &str,
        action: LifecycleAction,
        timeout: Duration,
    ) -> Result<String, DashboardError> {
        write(&self.dokku, app, action.as_str(), &DokkuCommand::lifecycle(action, app), timeout).await
    }

    async fn config_set(
        &self,
        app: &str,
        key: &str,
        value: &str,
        restart: bool,
        timeout: Duration,
    ) -> Result<String, DashboardError> {
        let command = DokkuCommand::config_set(app, key, value, restart);
        write(&self.dokku, app, "config:set", &command, timeout).await
    }

    async fn config_unset(
        &self,
        app: &str,
        key: &str,
        restart: bool,
        timeout: Duration,
    ) -> Result<String, DashboardError> {
        let command = DokkuCommand::config_unset(app, key, restart);
        write(&self.dokku, app, "config:unset", &command, timeout).await
    }

    async fn logs_recent(&self, app: &str, lines: u32) -> Vec<String> {
        recent_log_lines(&self.dokku, app, lines, self.timeouts.command()).await
    }

    async fn logs_stream(&self, app: &str, lines: u32) -> Result<LineStream, DashboardError> {
        self.dokku.stream(&DokkuCommand::logs(app, lines, true))
    }

    async fn certificates(&self) -> Vec<SslCertificate> {
        let output = report(&self.dokku, &DokkuCommand::new("letsencrypt:list"), self.timeouts.command()).await;
        parsers::certs::parse_letsencrypt_list(&output)
    }

    async fn services(&self) -> Vec<Service> {
        self.state.services().await
    }

    async fn plugins(&self) -> Vec<Plugin> {
        let output = report(&self.dokku, &DokkuCommand::new("plugin:list"), self.timeouts.command()).await;
        parsers::system::parse_plugin_list(&output)
    }

    async fn system_info(&self) -> SystemInfo {
        let version_cmd = DokkuCommand::new("version");
        let docker = self.state.docker();
        let (version, docker_version, containers, images, volumes, names) = tokio::join!(
            self.dokku.run(&version_cmd, self.timeouts.command()),
            docker.server_version(),
            docker.container_count(),
            docker.image_count(),
            docker.volume_count(),
            self.state.list_app_names()
        );

        let host = if self.host_metrics {
            telemetry::sample_host_metrics().await
        } else {
            None
        };

        SystemInfo {
            dokku_version: parsers::system::parse_dokku_version(&version)
                .unwrap_or_else(|| "unknown".to_string()),
            docker_version,
            app_count: names.len(),
            container_count: containers,
            image_count: images,
            volume_count: volumes,
            host,
        }
    }
}
