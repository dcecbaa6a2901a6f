//! The data-source seam shared by the local and remote paths

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::selector::SourceKind;
use crate::command::DokkuCommand;
use crate::errors::DashboardError;
use crate::local::DokkuCli;
use crate::models::app::{Application, LifecycleAction, ProcessScale, ProcessSnapshot};
use crate::models::certificate::{SslCertificate, SslStatus};
use crate::models::env_var::EnvironmentVariable;
use crate::models::report::{HealthCheckConfig, NetworkConfig, StorageMount};
use crate::models::service::Service;
use crate::models::system::{Plugin, SystemInfo};
use crate::process::{LineStream, ProcessOutput};
use crate::remote::SshRunner;

/// One way of reading and changing host state.
///
/// Reads never fail: missing or malformed data comes back as the type's
/// default. Writes report failures.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn list_app_names(&self) -> Vec<String>;

    /// Every app with status and domains; apps that fail to resolve are
    /// included as unknown
    async fn list_apps(&self) -> Vec<Application>;

    async fn processes(&self, app: &str) -> ProcessSnapshot;
    async fn domains(&self, app: &str) -> Vec<String>;
    async fn deploy_source(&self, app: &str) -> String;
    async fn config(&self, app: &str) -> Vec<EnvironmentVariable>;
    async fn scaling(&self, app: &str) -> Vec<ProcessScale>;
    async fn network(&self, app: &str) -> NetworkConfig;
    async fn storage(&self, app: &str) -> Vec<StorageMount>;
    async fn ssl_status(&self, app: &str) -> SslStatus;
    async fn health_checks(&self, app: &str) -> HealthCheckConfig;

    /// Issue a lifecycle action, returning the command output
    async fn control(
        &self,
        app: &str,
        action: LifecycleAction,
        timeout: Duration,
    ) -> Result<String, DashboardError>;

    async fn config_set(
        &self,
        app: &str,
        key: &str,
        value: &str,
        restart: bool,
        timeout: Duration,
    ) -> Result<String, DashboardError>;

    async fn config_unset(
        &self,
        app: &str,
        key: &str,
        restart: bool,
        timeout: Duration,
    ) -> Result<String, DashboardError>;

    /// Last `lines` raw log lines
    async fn logs_recent(&self, app: &str, lines: u32) -> Vec<String>;

    /// Follow the log, starting with the last `lines` lines
    async fn logs_stream(&self, app: &str, lines: u32) -> Result<LineStream, DashboardError>;

    async fn certificates(&self) -> Vec<SslCertificate>;
    async fn services(&self) -> Vec<Service>;
    async fn plugins(&self) -> Vec<Plugin>;
    async fn system_info(&self) -> SystemInfo;
}

/// Something that executes dokku commands
#[async_trait]
pub trait DokkuChannel: Send + Sync {
    async fn execute(
        &self,
        command: &DokkuCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError>;
}

#[async_trait]
impl DokkuChannel for DokkuCli {
    async fn execute(
        &self,
        command: &DokkuCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        DokkuCli::execute(self, command, timeout).await
    }
}

#[async_trait]
impl DokkuChannel for SshRunner {
    async fn execute(
        &self,
        command: &DokkuCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        SshRunner::execute(self, command, timeout).await
    }
}

/// Report text of a successful command, empty otherwise
pub(crate) async fn report<C>(channel: &C, command: &DokkuCommand, timeout: Duration) -> String
where
    C: DokkuChannel + ?Sized,
{
    report_output(command, channel.execute(command, timeout).await)
}

pub(crate) fn report_output(
    command: &DokkuCommand,
    result: Result<ProcessOutput, DashboardError>,
) -> String {
    match result {
        Ok(output) if output.success() => output.stdout,
        Ok(output) => {
            debug!("{} exited {:?}, treating as no data", command, output.exit_code);
            String::new()
        }
        Err(e) => {
            warn!("{} returned no data: {}", command, e);
            String::new()
        }
    }
}

/// Run a write command; a non-zero exit is a failure carrying the output
pub(crate) async fn write<C>(
    channel: &C,
    app: &str,
    action: &str,
    command: &DokkuCommand,
    timeout: Duration,
) -> Result<String, DashboardError>
where
    C: DokkuChannel + ?Sized,
{
    info!("{} {}: {}", action, app, command.subcommand());
    let output = channel.execute(command, timeout).await?;
    if output.success() {
        Ok(output.text().trim().to_string())
    } else {
        warn!("{} {} failed with {:?}", action, app, output.exit_code);
        Err(DashboardError::ControlFailed {
            action: action.to_string(),
            app: app.to_string(),
            message: output.text().trim().to_string(),
        })
    }
}

/// Log lines of `logs -n`; stderr is kept since container stderr lands there
pub(crate) async fn recent_log_lines<C>(
    channel: &C,
    app: &str,
    lines: u32,
    timeout: Duration,
) -> Vec<String>
where
    C: DokkuChannel + ?Sized,
{
    let command = DokkuCommand::logs(app, lines, false);
    match channel.execute(&command, timeout).await {
        Ok(output) if output.success() => output
            .text()
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect(),
        Ok(output) => {
            debug!("{} exited {:?}", command, output.exit_code);
            Vec::new()
        }
        Err(e) => {
            warn!("{} returned no data: {}", command, e);
            Vec::new()
        }
    }
}
