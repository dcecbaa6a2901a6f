//! Data source over ssh: dokku commands plus report parsing

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use secrecy::SecretString;
use tracing::debug;

use crate::client::selector::SourceKind;
use crate::client::source::{recent_log_lines, report, report_output, write, DataSource};
use crate::command::{is_valid_app_name, DokkuCommand};
use crate::config::settings::TimeoutSettings;
use crate::errors::DashboardError;
use crate::models::app::{Application, LifecycleAction, ProcessScale, ProcessSnapshot};
use crate::models::certificate::{SslCertificate, SslStatus};
use crate::models::env_var::EnvironmentVariable;
use crate::models::report::{HealthCheckConfig, NetworkConfig, StorageMount};
use crate::models::service::{image_version, Service, ServiceStatus, ServiceType};
use crate::models::system::{Plugin, SystemInfo};
use crate::parsers;
use crate::process::LineStream;
use crate::remote::{SshBatch, SshRunner};

/// Apps resolved at once over a shared connection
const LIST_CONCURRENCY: usize = 4;

pub struct RemoteSource {
    ssh: SshRunner,
    timeouts: TimeoutSettings,
}

impl RemoteSource {
    pub fn new(ssh: SshRunner, timeouts: TimeoutSettings) -> Self {
        Self { ssh, timeouts }
    }

    async fn report(&self, subcommand: &str, app: &str) -> String {
        report(&self.ssh, &DokkuCommand::for_app(subcommand, app), self.timeouts.command()).await
    }

    async fn batch_report(&self, batch: &SshBatch, command: &DokkuCommand, timeout: Duration) -> String {
        report_output(command, batch.execute(command, timeout).await)
    }

    /// Status and domains of one app, `Unknown` when the host does not answer
    async fn resolve_listed(&self, batch: &SshBatch, name: String) -> Application {
        let timeout = self.timeouts.list_item();
        let ps = self
            .batch_report(batch, &DokkuCommand::for_app("ps:report", &name), timeout)
            .await;
        if ps.trim().is_empty() {
            debug!("No process report for {}", name);
            return Application::unknown(name);
        }
        let snapshot = parsers::apps::parse_process_report(&ps);
        let domains = parsers::apps::parse_domains(
            &self
                .batch_report(batch, &DokkuCommand::for_app("domains:report", &name), timeout)
                .await,
        );
        Application::new(name, snapshot.status, domains).with_container_count(snapshot.container_count)
    }

    async fn service(&self, batch: &SshBatch, service_type: ServiceType, name: String) -> Service {
        let command = DokkuCommand::for_app(&format!("{}:info", service_type), &name);
        let info = batch.run(&command, self.timeouts.command()).await;
        let info = parsers::services::parse_service_info(&info);

        Service {
            version: if info.version.is_empty() {
                "unknown".to_string()
            } else {
                image_version(&info.version)
            },
            status: ServiceStatus::from_state(&info.status),
            dsn: SecretString::from(info.dsn),
            linked_apps: info.links,
            config_dir: info.config_dir,
            data_dir: info.data_dir,
            service_type,
            name,
        }
    }
}

#[async_trait]
impl DataSource for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn list_app_names(&self) -> Vec<String> {
        let output = report(&self.ssh, &DokkuCommand::new("apps:list"), self.timeouts.command()).await;
        parsers::apps::parse_app_list(&output)
    }

    async fn list_apps(&self) -> Vec<Application> {
        let batch = self.ssh.batch().await;
        debug!("Listing apps, shared connection: {}", batch.is_multiplexed());
        let output = self
            .batch_report(&batch, &DokkuCommand::new("apps:list"), self.timeouts.command())
            .await;
        let names = parsers::apps::parse_app_list(&output);

        let apps = stream::iter(names)
            .map(|name| {
                let batch = &batch;
                async move {
                    if is_valid_app_name(&name) {
                        self.resolve_listed(batch, name).await
                    } else {
                        Application::unknown(name)
                    }
                }
            })
            .buffered(LIST_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        batch.close().await;
        apps
    }

    async fn processes(&self, app: &str) -> ProcessSnapshot {
        parsers::apps::parse_process_report(&self.report("ps:report", app).await)
    }

    async fn domains(&self, app: &str) -> Vec<String> {
        parsers::apps::parse_domains(&self.report("domains:report", app).await)
    }

    async fn deploy_source(&self, app: &str) -> String {
        parsers::apps::parse_deploy_source(&self.report("git:report", app).await)
    }

    async fn config(&self, app: &str) -> Vec<EnvironmentVariable> {
        parsers::config::parse_config(&self.report("config:show", app).await)
    }

    async fn scaling(&self, app: &str) -> Vec<ProcessScale> {
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
        parsers::storage::parse_storage(&self.report("storage:report", app).await)
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
        write(&self.ssh, app, action.as_str(), &DokkuCommand::lifecycle(action, app), timeout).await
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
        write(&self.ssh, app, "config:set", &command, timeout).await
    }

    async fn config_unset(
        &self,
        app: &str,
        key: &str,
        restart: bool,
        timeout: Duration,
    ) -> Result<String, DashboardError> {
        let command = DokkuCommand::config_unset(app, key, restart);
        write(&self.ssh, app, "config:unset", &command, timeout).await
    }

    async fn logs_recent(&self, app: &str, lines: u32) -> Vec<String> {
        recent_log_lines(&self.ssh, app, lines, self.timeouts.command()).await
    }

    /// The stream holds its own master connection until it is dropped
    async fn logs_stream(&self, app: &str, lines: u32) -> Result<LineStream, DashboardError> {
        let batch = self.ssh.batch().await;
        batch.stream(&DokkuCommand::logs(app, lines, true))
    }

    async fn certificates(&self) -> Vec<SslCertificate> {
        let output = report(&self.ssh, &DokkuCommand::new("letsencrypt:list"), self.timeouts.command()).await;
        parsers::certs::parse_letsencrypt_list(&output)
    }

    async fn services(&self) -> Vec<Service> {
        let batch = self.ssh.batch().await;
        let mut services = Vec::new();

        for service_type in ServiceType::ALL {
            let list = DokkuCommand::new(format!("{}:list", service_type));
            let output = self.batch_report(&batch, &list, self.timeouts.command()).await;
            for name in parsers::services::parse_service_list(&output) {
                services.push(self.service(&batch, service_type, name).await);
            }
        }

        batch.close().await;
        services
    }

    async fn plugins(&self) -> Vec<Plugin> {
        let output = report(&self.ssh, &DokkuCommand::new("plugin:list"), self.timeouts.command()).await;
        parsers::system::parse_plugin_list(&output)
    }

    /// Docker counts and host metrics are not reachable through dokku
    async fn system_info(&self) -> SystemInfo {
        let version_cmd = DokkuCommand::new("version");
        let (version, names) = tokio::join!(
            self.ssh.run(&version_cmd, self.timeouts.command()),
            self.list_app_names()
        );

        SystemInfo {
            dokku_version: parsers::system::parse_dokku_version(&version)
                .unwrap_or_else(|| "unknown".to_string()),
            app_count: names.len(),
            ..SystemInfo::default()
        }
    }
}
