//! Subprocess execution
//!
//! Every external program (docker, dokku, ssh) goes through
//! [`ProcessRunner`], always with an argument vector, never a shell string.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::errors::DashboardError;
use crate::process::stream::LineStream;

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn new(exit_code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Successful run printing `stdout`
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::new(Some(0), stdout, "")
    }

    /// Failed run printing `stderr`
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self::new(Some(code), "", stderr)
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout if non-empty, else stderr, else empty
    pub fn text(&self) -> &str {
        if !self.stdout.trim().is_empty() {
            &self.stdout
        } else if !self.stderr.trim().is_empty() {
            &self.stderr
        } else {
            ""
        }
    }
}

/// A long-lived helper process owned by the caller.
///
/// The process is killed when the handle is dropped.
#[derive(Debug, Default)]
pub struct BackgroundProcess {
    child: Option<Child>,
}

impl BackgroundProcess {
    pub fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    /// Handle that owns nothing
    pub fn detached() -> Self {
        Self { child: None }
    }

    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Kill the process and reap it
    pub async fn terminate(mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
    }
}

/// Seam over process spawning
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion, capturing output; `Timeout` past the deadline
    async fn output(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError>;

    /// Spawn and stream stdout/stderr lines until the consumer lets go
    fn stream(&self, program: &str, args: &[String]) -> Result<LineStream, DashboardError>;

    /// Spawn a helper that keeps running until the returned handle is dropped
    fn spawn_background(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<BackgroundProcess, DashboardError>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(program: &str, args: &[String]) -> Command {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        command
    }
}

fn spawn_error(program: &str, e: std::io::Error) -> DashboardError {
    DashboardError::CommandError(format!("Failed to run {}: {}", program, e))
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn output(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        debug!("Running {} {:?} (timeout {:?})", program, args, timeout);

        let child = Self::command(program, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        // Dropping the future on timeout drops the child, which kills it
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ProcessOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(e)) => Err(spawn_error(program, e)),
            Err(_) => {
                warn!("{} timed out after {:?}", program, timeout);
                Err(DashboardError::Timeout {
                    command: format!("{} {}", program, args.join(" ")),
                    timeout,
                })
            }
        }
    }

    fn stream(&self, program: &str, args: &[String]) -> Result<LineStream, DashboardError> {
        debug!("Streaming {} {:?}", program, args);

        let child = Self::command(program, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        Ok(LineStream::from_child(child))
    }

    fn spawn_background(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<BackgroundProcess, DashboardError> {
        debug!("Spawning background {} {:?}", program, args);

        let child = Self::command(program, args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        Ok(BackgroundProcess::new(child))
    }
}
