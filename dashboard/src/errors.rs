//! Error types for the dashboard core

use std::time::Duration;

use thiserror::Error;

/// Main error type for the dashboard core.
///
/// Read paths swallow these and fall back to defaults; only control
/// actions, config edits and startup surface them to the caller.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Command error: {0}")]
    CommandError(String),

    #[error("Command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    #[error("{action} failed for {app}: {message}")]
    ControlFailed {
        action: String,
        app: String,
        message: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No data source reachable: {0}")]
    Unreachable(String),
}

impl DashboardError {
    /// True when the error came from a command exceeding its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, DashboardError::Timeout { .. })
    }
}
