//! Remote command runner over the system `ssh` client
//!
//! Plain calls open a fresh connection each time. A [`SshBatch`] keeps one
//! multiplexed master connection (`ControlMaster`) alive for a sequence of
//! calls, or for the lifetime of one stream, and tears it down afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::command::DokkuCommand;
use crate::config::settings::SshSettings;
use crate::errors::DashboardError;
use crate::process::{BackgroundProcess, LineStream, ProcessOutput, ProcessRunner};
use crate::utils::truncate_for_log;

const SSH_BIN: &str = "ssh";

/// How often a starting master connection is probed
const MASTER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where and as whom to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub user: String,
    pub port: u16,
    pub key_path: PathBuf,
    pub connect_timeout: Duration,
    /// Value for `StrictHostKeyChecking`
    pub host_key_checking: String,
}

impl SshTarget {
    pub fn from_settings(settings: &SshSettings) -> Self {
        Self {
            host: settings.host.clone(),
            user: settings.user.clone(),
            port: settings.port,
            key_path: settings.key_path.clone(),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            host_key_checking: settings.host_key_checking.clone(),
        }
    }

    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Executes dokku commands on the remote host
#[derive(Clone)]
pub struct SshRunner {
    target: SshTarget,
    runner: Arc<dyn ProcessRunner>,
}

impl SshRunner {
    pub fn new(target: SshTarget, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { target, runner }
    }

    pub fn target(&self) -> &SshTarget {
        &self.target
    }

    /// Connection options shared by every invocation
    fn base_args(&self, control_path: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            self.target.key_path.display().to_string(),
            "-p".to_string(),
            self.target.port.to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.target.connect_timeout.as_secs().max(1)),
            "-o".to_string(),
            format!("StrictHostKeyChecking={}", self.target.host_key_checking),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
        ];
        if let Some(path) = control_path {
            args.push("-o".to_string());
            args.push(format!("ControlPath={}", path.display()));
        }
        args
    }

    fn command_args(&self, command: &DokkuCommand, control_path: Option<&Path>, tty: bool) -> Vec<String> {
        let mut args = self.base_args(control_path);
        if tty {
            // Remote process gets SIGHUP when the connection goes away
            args.push("-tt".to_string());
        }
        args.push(self.target.destination());
        args.push(command.to_shell_string());
        args
    }

    async fn execute_with(
        &self,
        command: &DokkuCommand,
        control_path: Option<&Path>,
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        debug!("ssh {}: {}", self.target.destination(), command);
        let args = self.command_args(command, control_path, false);
        let output = self.runner.output(SSH_BIN, &args, timeout).await?;
        debug!(
            "ssh {} exited {:?}: {}",
            command.subcommand(),
            output.exit_code,
            truncate_for_log(output.text(), 200)
        );
        Ok(output)
    }

    /// Run `command` on a fresh connection, returning the full result
    pub async fn execute(
        &self,
        command: &DokkuCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        self.execute_with(command, None, timeout).await
    }

    /// Run `command` and return its output text.
    ///
    /// Timeouts and transport failures yield an empty string.
    pub async fn run(&self, command: &DokkuCommand, timeout: Duration) -> String {
        text_or_empty(command, self.execute(command, timeout).await)
    }

    /// Open a batch session sharing one connection.
    ///
    /// Falls back to per-call connections when the master does not come up.
    pub async fn batch(&self) -> SshBatch {
        let control = match self.open_master().await {
            Ok((dir, master)) => {
                debug!("ssh master connection up for {}", self.target.destination());
                Some(ControlSession { dir, master })
            }
            Err(e) => {
                warn!("ssh master connection unavailable, using per-call connections: {}", e);
                None
            }
        };
        SshBatch {
            ssh: self.clone(),
            control,
        }
    }

    async fn open_master(&self) -> Result<(TempDir, BackgroundProcess), DashboardError> {
        let dir = tempfile::Builder::new().prefix("dokku-dash-").tempdir()?;
        let socket = control_socket(&dir);

        let mut args = vec!["-M".to_string(), "-N".to_string()];
        args.extend(self.base_args(Some(&socket)));
        args.push(self.target.destination());
        let master = self.runner.spawn_background(SSH_BIN, &args)?;

        let deadline = tokio::time::Instant::now() + self.target.connect_timeout;
        loop {
            if self.check_master(&socket).await {
                return Ok((dir, master));
            }
            if tokio::time::Instant::now() >= deadline {
                master.terminate().await;
                return Err(DashboardError::Timeout {
                    command: "ssh -M".to_string(),
                    timeout: self.target.connect_timeout,
                });
            }
            tokio::time::sleep(MASTER_POLL_INTERVAL).await;
        }
    }

    async fn control_op(&self, socket: &Path, op: &str) -> bool {
        let mut args = self.base_args(Some(socket));
        args.push("-O".to_string());
        args.push(op.to_string());
        args.push(self.target.destination());
        matches!(
            self.runner.output(SSH_BIN, &args, self.target.connect_timeout).await,
            Ok(output) if output.success()
        )
    }

    async fn check_master(&self, socket: &Path) -> bool {
        self.control_op(socket, "check").await
    }
}

fn control_socket(dir: &TempDir) -> PathBuf {
    dir.path().join("master.sock")
}

fn text_or_empty(command: &DokkuCommand, result: Result<ProcessOutput, DashboardError>) -> String {
    match result {
        Ok(output) => output.text().to_string(),
        Err(e) => {
            warn!("{} returned no data: {}", command.subcommand(), e);
            String::new()
        }
    }
}

struct ControlSession {
    dir: TempDir,
    master: BackgroundProcess,
}

/// Several commands over one multiplexed connection.
///
/// Dropping the batch kills the master process and removes its socket.
pub struct SshBatch {
    ssh: SshRunner,
    control: Option<ControlSession>,
}

impl SshBatch {
    fn socket(&self) -> Option<PathBuf> {
        self.control.as_ref().map(|c| control_socket(&c.dir))
    }

    /// True when commands share a master connection
    pub fn is_multiplexed(&self) -> bool {
        self.control.is_some()
    }

    pub async fn execute(
        &self,
        command: &DokkuCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        let socket = self.socket();
        self.ssh.execute_with(command, socket.as_deref(), timeout).await
    }

    /// Same contract as [`SshRunner::run`]
    pub async fn run(&self, command: &DokkuCommand, timeout: Duration) -> String {
        text_or_empty(command, self.execute(command, timeout).await)
    }

    /// Stream `command` over the shared connection.
    ///
    /// The batch moves into the stream and is closed once the remote
    /// command ends or the stream is dropped.
    pub fn stream(self, command: &DokkuCommand) -> Result<LineStream, DashboardError> {
        debug!("ssh stream {}: {}", self.ssh.target.destination(), command);
        let socket = self.socket();
        let args = self.ssh.command_args(command, socket.as_deref(), true);
        let lines = self.ssh.runner.stream(SSH_BIN, &args)?;
        Ok(LineStream::with_cleanup(lines, self.close()))
    }

    /// Ask the master to exit, then reap it
    pub async fn close(mut self) {
        if let Some(control) = self.control.take() {
            let socket = control_socket(&control.dir);
            if !self.ssh.control_op(&socket, "exit").await {
                debug!("ssh master did not acknowledge exit");
            }
            control.master.terminate().await;
        }
    }
}
