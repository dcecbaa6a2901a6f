//! Host filesystem layout

use std::path::PathBuf;

use crate::config::settings::PathSettings;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::models::report::MountPhase;
use crate::models::service::ServiceType;

/// Entries under the dokku root that are not applications
pub const RESERVED_NAMES: [&str; 4] = ["ENV", "VHOST", "tls", "dokkurc"];

/// Where dokku keeps per-app and per-service state
#[derive(Debug, Clone)]
pub struct HostLayout {
    pub dokku_root: PathBuf,
    pub services_root: PathBuf,
}

impl HostLayout {
    pub fn new(dokku_root: impl Into<PathBuf>, services_root: impl Into<PathBuf>) -> Self {
        Self {
            dokku_root: dokku_root.into(),
            services_root: services_root.into(),
        }
    }

    pub fn from_settings(paths: &PathSettings) -> Self {
        Self::new(&paths.dokku_root, &paths.services_root)
    }

    pub fn is_reserved(name: &str) -> bool {
        name.starts_with('.') || RESERVED_NAMES.contains(&name)
    }

    pub fn apps_dir(&self) -> Dir {
        Dir::new(&self.dokku_root)
    }

    pub fn app_dir(&self, app: &str) -> Dir {
        Dir::new(self.dokku_root.join(app))
    }

    /// `KEY=VALUE` environment file
    pub fn env_file(&self, app: &str) -> File {
        self.app_dir(app).file("ENV")
    }

    /// Newline-delimited domain list
    pub fn vhost_file(&self, app: &str) -> File {
        self.app_dir(app).file("VHOST")
    }

    /// `type=count` process scaling
    pub fn scale_file(&self, app: &str) -> File {
        self.app_dir(app).file("DOKKU_SCALE")
    }

    /// Extra docker options applied during `phase`
    pub fn docker_options_file(&self, app: &str, phase: MountPhase) -> File {
        let name = match phase {
            MountPhase::Build => "DOCKER_OPTIONS_BUILD",
            MountPhase::Deploy => "DOCKER_OPTIONS_DEPLOY",
            MountPhase::Run => "DOCKER_OPTIONS_RUN",
        };
        self.app_dir(app).file(name)
    }

    pub fn service_type_dir(&self, service_type: ServiceType) -> Dir {
        Dir::new(self.services_root.join(service_type.as_str()))
    }

    pub fn service_dir(&self, service_type: ServiceType, name: &str) -> Dir {
        self.service_type_dir(service_type).subdir(name)
    }

    pub fn service_env_file(&self, service_type: ServiceType, name: &str) -> File {
        self.service_dir(service_type, name).file("ENV")
    }

    pub fn service_data_dir(&self, service_type: ServiceType, name: &str) -> Dir {
        self.service_dir(service_type, name).subdir("data")
    }
}

impl Default for HostLayout {
    fn default() -> Self {
        Self::from_settings(&PathSettings::default())
    }
}
