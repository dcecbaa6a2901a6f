//! Container runtime queries through the `docker` CLI

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::app::{ApplicationStatus, ProcessSnapshot};
use crate::process::ProcessRunner;

/// Label dokku puts on every app container
pub const APP_LABEL: &str = "com.dokku.app-name";

const PROCESS_TYPE_LABEL: &str = "com.dokku.process-type";

static EXIT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Exited \((-?\d+)\)").expect("valid exit code regex"));

/// One row of `docker ps --format '{{json .}}'`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(rename = "Names", default)]
    pub names: String,

    #[serde(rename = "Image", default)]
    pub image: String,

    /// `running`, `exited`, ...
    #[serde(rename = "State", default)]
    pub state: String,

    /// Human status, e.g. `Exited (137) 2 hours ago`
    #[serde(rename = "Status", default)]
    pub status: String,

    /// Comma separated `key=value` pairs
    #[serde(rename = "Labels", default)]
    pub labels: String,
}

impl ContainerSummary {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| k.trim() == key)
            .map(|(_, v)| v.trim())
    }

    pub fn app_name(&self) -> Option<&str> {
        self.label(APP_LABEL)
    }

    pub fn process_type(&self) -> Option<&str> {
        self.label(PROCESS_TYPE_LABEL)
    }

    pub fn exit_code(&self) -> Option<i64> {
        EXIT_CODE_RE
            .captures(self.status.trim())
            .and_then(|caps| caps[1].parse().ok())
    }

    pub fn app_status(&self) -> ApplicationStatus {
        ApplicationStatus::from_container_state(&self.state, self.exit_code())
    }
}

/// Rows of `docker ps --format '{{json .}}'`; unparseable rows are skipped
pub fn parse_container_lines(output: &str) -> Vec<ContainerSummary> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Skipping unparseable container row: {}", e);
                None
            }
        })
        .collect()
}

/// Status and count of one application's containers
pub fn snapshot(containers: &[&ContainerSummary]) -> ProcessSnapshot {
    ProcessSnapshot {
        status: ApplicationStatus::aggregate(containers.iter().map(|c| c.app_status())),
        container_count: u32::try_from(containers.len()).unwrap_or(u32::MAX),
    }
}

/// Group containers by their app label
pub fn group_by_app(containers: &[ContainerSummary]) -> BTreeMap<String, Vec<&ContainerSummary>> {
    let mut groups: BTreeMap<String, Vec<&ContainerSummary>> = BTreeMap::new();
    for container in containers {
        if let Some(app) = container.app_name() {
            groups.entry(app.to_string()).or_default().push(container);
        }
    }
    groups
}

/// `docker` invoked with argument lists
#[derive(Clone)]
pub struct DockerCli {
    bin: String,
    runner: Arc<dyn ProcessRunner>,
    timeout: Duration,
}

impl DockerCli {
    pub fn new(bin: impl Into<String>, runner: Arc<dyn ProcessRunner>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            runner,
            timeout,
        }
    }

    /// stdout of a successful run, `None` otherwise
    async fn query(&self, args: &[&str]) -> Option<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        match self.runner.output(&self.bin, &args, self.timeout).await {
            Ok(output) if output.success() => Some(output.stdout),
            Ok(output) => {
                debug!("docker {:?} failed: {}", args, output.stderr.trim());
                None
            }
            Err(e) => {
                warn!("docker {:?} failed: {}", args, e);
                None
            }
        }
    }

    /// Containers labelled for `app`, or for every app when `None`
    pub async fn app_containers(&self, app: Option<&str>) -> Vec<ContainerSummary> {
        let filter = match app {
            Some(app) => format!("label={}={}", APP_LABEL, app),
            None => format!("label={}", APP_LABEL),
        };
        self.query(&["ps", "-a", "--filter", &filter, "--format", "{{json .}}"])
            .await
            .map(|out| parse_container_lines(&out))
            .unwrap_or_default()
    }

    /// `(state, image)` of a named container
    pub async fn inspect_state_image(&self, container: &str) -> Option<(String, String)> {
        let out = self
            .query(&["inspect", container, "--format", "{{.State.Status}}|{{.Config.Image}}"])
            .await?;
        let (state, image) = out.trim().split_once('|')?;
        Some((state.to_string(), image.to_string()))
    }

    pub async fn server_version(&self) -> Option<String> {
        self.query(&["info", "--format", "{{.ServerVersion}}"])
            .await
            .map(|out| out.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Non-empty output lines, `None` when docker could not answer
    async fn count_lines(&self, args: &[&str]) -> Option<usize> {
        self.query(args)
            .await
            .map(|out| out.lines().filter(|l| !l.trim().is_empty()).count())
    }

    pub async fn container_count(&self) -> Option<usize> {
        self.count_lines(&["ps", "-aq"]).await
    }

    pub async fn image_count(&self) -> Option<usize> {
        self.count_lines(&["images", "-q"]).await
    }

    pub async fn volume_count(&self) -> Option<usize> {
        self.count_lines(&["volume", "ls", "-q"]).await
    }
}
