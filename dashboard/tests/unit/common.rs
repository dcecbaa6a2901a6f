//! Shared test fixtures

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use dokku_dashboard::client::{DokkuClient, LocalSource, RemoteSource};
use dokku_dashboard::config::layout::HostLayout;
use dokku_dashboard::config::settings::TimeoutSettings;
use dokku_dashboard::errors::DashboardError;
use dokku_dashboard::local::{DockerCli, DokkuCli, LocalStateReader};
use dokku_dashboard::process::{BackgroundProcess, LineStream, ProcessOutput, ProcessRunner};
use dokku_dashboard::remote::{SshRunner, SshTarget};

#[derive(Debug, Clone)]
pub enum Reply {
    Output(ProcessOutput),
    Timeout,
}

/// Scripted [`ProcessRunner`].
///
/// Each invocation is matched against the scripted patterns (substring of
/// the program and its arguments joined by spaces); the first match wins.
/// Unmatched commands exit 1. ssh `-O` control operations succeed unless
/// the runner was built with [`FakeRunner::without_master`].
#[derive(Default)]
pub struct FakeRunner {
    script: Vec<(String, Reply)>,
    stream_lines: Vec<String>,
    master_down: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, pattern: &str, stdout: &str) -> Self {
        self.script
            .push((pattern.to_string(), Reply::Output(ProcessOutput::ok(stdout))));
        self
    }

    pub fn fail(mut self, pattern: &str, code: i32, stderr: &str) -> Self {
        self.script
            .push((pattern.to_string(), Reply::Output(ProcessOutput::failed(code, stderr))));
        self
    }

    pub fn time_out(mut self, pattern: &str) -> Self {
        self.script.push((pattern.to_string(), Reply::Timeout));
        self
    }

    pub fn streaming(mut self, lines: &[&str]) -> Self {
        self.stream_lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// ssh master connections never come up: every `-O` operation fails
    pub fn without_master(mut self) -> Self {
        self.master_down = true;
        self
    }

    fn record(&self, program: &str, args: &[String]) -> String {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        let joined = call.join(" ");
        self.calls.lock().unwrap().push(call);
        joined
    }

    /// Every invocation as `program arg arg ...`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.join(" ")).collect()
    }

    /// Raw argument vectors, program first
    pub fn raw_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Index of the first call containing `pattern`
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.calls().iter().position(|call| call.contains(pattern))
    }

    /// Wait until a call containing `pattern` shows up
    pub async fn wait_for_call(&self, pattern: &str) -> bool {
        for _ in 0..100 {
            if self.position(pattern).is_some() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    /// Calls issuing a dokku command, ssh control operations excluded
    pub fn command_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.contains(" -O ") && !call.contains(" -M "))
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn output(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        let joined = self.record(program, args);
        if args.iter().any(|a| a == "-O") {
            return Ok(if self.master_down {
                ProcessOutput::failed(255, "Control socket connect: No such file or directory")
            } else {
                ProcessOutput::ok("")
            });
        }

        let reply = self
            .script
            .iter()
            .find(|(pattern, _)| joined.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Timeout) => Err(DashboardError::Timeout { command: joined, timeout }),
            None => Ok(ProcessOutput::failed(1, "not scripted")),
        }
    }

    fn stream(&self, program: &str, args: &[String]) -> Result<LineStream, DashboardError> {
        self.record(program, args);
        Ok(LineStream::from_lines(self.stream_lines.clone()))
    }

    fn spawn_background(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<BackgroundProcess, DashboardError> {
        self.record(program, args);
        Ok(BackgroundProcess::detached())
    }
}

pub fn ssh_target() -> SshTarget {
    SshTarget {
        host: "dokku.example.com".to_string(),
        user: "dokku".to_string(),
        port: 22,
        key_path: "/keys/id_ed25519".into(),
        connect_timeout: Duration::from_secs(2),
        host_key_checking: "accept-new".to_string(),
    }
}

/// Client over the remote path with every process going to `runner`
pub fn remote_client(runner: Arc<FakeRunner>) -> DokkuClient {
    remote_client_with(runner, ssh_target())
}

pub fn remote_client_with(runner: Arc<FakeRunner>, target: SshTarget) -> DokkuClient {
    let ssh = SshRunner::new(target, runner);
    let source = RemoteSource::new(ssh, TimeoutSettings::default());
    DokkuClient::new(Arc::new(source), TimeoutSettings::default())
}

/// Client over the local path rooted at `root`
pub fn local_client(root: &Path, runner: Arc<FakeRunner>) -> DokkuClient {
    let layout = HostLayout::new(root.join("home"), root.join("services"));
    let docker = DockerCli::new("docker", runner.clone(), Duration::from_secs(5));
    let state = LocalStateReader::new(layout, docker);
    let dokku = DokkuCli::new("dokku", runner);
    let source = LocalSource::new(state, dokku, TimeoutSettings::default()).without_host_metrics();
    DokkuClient::new(Arc::new(source), TimeoutSettings::default())
}

/// Write `contents` to `path`, creating parent directories
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
