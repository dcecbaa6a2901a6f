//! One-time choice between the local and remote data path

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::settings::{DataSourceMode, Settings};
use crate::errors::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Docker and dokku on this host
    Local,
    /// dokku over ssh
    Remote,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Remote => "remote",
        }
    }

    /// Pick the path for `mode` given whether the control socket exists
    pub fn resolve(mode: DataSourceMode, control_socket_present: bool) -> SourceKind {
        match mode {
            DataSourceMode::Local => SourceKind::Local,
            DataSourceMode::Remote => SourceKind::Remote,
            DataSourceMode::Auto if control_socket_present => SourceKind::Local,
            DataSourceMode::Auto => SourceKind::Remote,
        }
    }

    /// Resolve from settings, checking the socket on disk once.
    ///
    /// Fails when the remote path is chosen but cannot work.
    pub fn select(settings: &Settings) -> Result<SourceKind, DashboardError> {
        let socket = &settings.paths.control_socket;
        let present = settings.data_source == DataSourceMode::Auto && socket_exists(socket);
        let kind = SourceKind::resolve(settings.data_source, present);

        if kind == SourceKind::Remote {
            check_remote(settings)?;
        }

        info!(
            "Using {} data source (mode {:?}, control socket {})",
            kind,
            settings.data_source,
            socket.display()
        );
        Ok(kind)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn socket_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

fn check_remote(settings: &Settings) -> Result<(), DashboardError> {
    if settings.ssh.host.trim().is_empty() {
        return Err(DashboardError::Unreachable(format!(
            "no control socket at {} and no remote host configured",
            settings.paths.control_socket.display()
        )));
    }
    if !settings.ssh.key_path.is_file() {
        return Err(DashboardError::Unreachable(format!(
            "ssh key {} not found",
            settings.ssh.key_path.display()
        )));
    }
    Ok(())
}
