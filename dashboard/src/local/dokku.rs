//! The `dokku` binary on the local host

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::command::DokkuCommand;
use crate::errors::DashboardError;
use crate::process::{LineStream, ProcessOutput, ProcessRunner};
use crate::utils::truncate_for_log;

/// Runs dokku commands as argument vectors, no shell involved
#[derive(Clone)]
pub struct DokkuCli {
    bin: String,
    runner: Arc<dyn ProcessRunner>,
}

impl DokkuCli {
    pub fn new(bin: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            bin: bin.into(),
            runner,
        }
    }

    pub async fn execute(
        &self,
        command: &DokkuCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, DashboardError> {
        let args = command.to_args();
        debug!("{} {:?}", self.bin, args);
        let output = self.runner.output(&self.bin, &args, timeout).await?;
        debug!(
            "{} exited {:?}: {}",
            command.subcommand(),
            output.exit_code,
            truncate_for_log(output.text(), 200)
        );
        Ok(output)
    }

    /// Output text, empty on any failure
    pub async fn run(&self, command: &DokkuCommand, timeout: Duration) -> String {
        match self.execute(command, timeout).await {
            Ok(output) => output.text().to_string(),
            Err(e) => {
                debug!("{} returned no data: {}", command.subcommand(), e);
                String::new()
            }
        }
    }

    pub fn stream(&self, command: &DokkuCommand) -> Result<LineStream, DashboardError> {
        self.runner.stream(&self.bin, &command.to_args())
    }
}
