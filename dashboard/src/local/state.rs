//! Best-effort reads of host state without going through dokku

use std::collections::BTreeMap;

use futures::future::join_all;
use secrecy::SecretString;
use tracing::debug;

use crate::command::is_valid_app_name;
use crate::config::layout::HostLayout;
use crate::local::docker::{group_by_app, snapshot, DockerCli};
use crate::local::files::{env_lookup, parse_env_file, parse_scale_file, parse_vhost};
use crate::models::app::{ApplicationStatus, ProcessScale, ProcessSnapshot};
use crate::models::env_var::EnvironmentVariable;
use crate::models::report::{MountPhase, StorageMount};
use crate::models::service::{image_version, Service, ServiceStatus, ServiceType};
use crate::parsers::storage::merge_mounts;

/// Reads app and service state from docker and the dokku directories
#[derive(Clone)]
pub struct LocalStateReader {
    layout: HostLayout,
    docker: DockerCli,
}

impl LocalStateReader {
    pub fn new(layout: HostLayout, docker: DockerCli) -> Self {
        Self { layout, docker }
    }

    pub fn layout(&self) -> &HostLayout {
        &self.layout
    }

    pub fn docker(&self) -> &DockerCli {
        &self.docker
    }

    /// App directories under the dokku root, sorted, reserved names excluded
    pub async fn list_app_names(&self) -> Vec<String> {
        self.layout
            .apps_dir()
            .list_dir_names()
            .await
            .into_iter()
            .filter(|name| !HostLayout::is_reserved(name) && is_valid_app_name(name))
            .collect()
    }

    pub async fn app_exists(&self, app: &str) -> bool {
        self.layout.app_dir(app).exists().await
    }

    /// With no containers the app is stopped if its directory exists,
    /// unknown otherwise
    pub async fn processes(&self, app: &str) -> ProcessSnapshot {
        let containers = self.docker.app_containers(Some(app)).await;
        let mine: Vec<_> = containers
            .iter()
            .filter(|c| c.app_name() == Some(app))
            .collect();

        if mine.is_empty() {
            return self.empty_snapshot(app).await;
        }
        snapshot(&mine)
    }

    async fn empty_snapshot(&self, app: &str) -> ProcessSnapshot {
        let status = if self.app_exists(app).await {
            ApplicationStatus::Stopped
        } else {
            ApplicationStatus::Unknown
        };
        ProcessSnapshot {
            status,
            container_count: 0,
        }
    }

    /// Snapshots for `apps` from a single container listing
    pub async fn processes_for(&self, apps: &[String]) -> BTreeMap<String, ProcessSnapshot> {
        let containers = self.docker.app_containers(None).await;
        let groups = group_by_app(&containers);

        let mut snapshots = BTreeMap::new();
        for app in apps {
            let snap = match groups.get(app) {
                Some(group) => snapshot(group),
                None => self.empty_snapshot(app).await,
            };
            snapshots.insert(app.clone(), snap);
        }
        snapshots
    }

    pub async fn domains(&self, app: &str) -> Vec<String> {
        self.layout
            .vhost_file(app)
            .read_optional()
            .await
            .map(|contents| parse_vhost(&contents))
            .unwrap_or_default()
    }

    /// ENV file contents sorted by key
    pub async fn env(&self, app: &str) -> Vec<EnvironmentVariable> {
        self.layout
            .env_file(app)
            .read_optional()
            .await
            .map(|contents| parse_env_file(&contents))
            .unwrap_or_default()
    }

    pub async fn scale(&self, app: &str) -> Vec<ProcessScale> {
        self.layout
            .scale_file(app)
            .read_optional()
            .await
            .map(|contents| parse_scale_file(&contents))
            .unwrap_or_default()
    }

    /// Bind mounts from the docker option files of every phase
    pub async fn storage(&self, app: &str) -> Vec<StorageMount> {
        let mut mounts = Vec::new();
        for phase in [MountPhase::Build, MountPhase::Deploy, MountPhase::Run] {
            if let Some(contents) = self.layout.docker_options_file(app, phase).read_optional().await {
                for line in contents.lines() {
                    merge_mounts(&mut mounts, phase, line);
                }
            }
        }
        mounts
    }

    /// Every datastore service on the host
    pub async fn services(&self) -> Vec<Service> {
        let apps = self.list_app_names().await;
        let app_envs: Vec<(String, String)> = join_all(apps.iter().map(|app| async move {
            let contents = self.layout.env_file(app).read_optional().await.unwrap_or_default();
            (app.clone(), contents)
        }))
        .await;

        let mut services = Vec::new();
        for service_type in ServiceType::ALL {
            let names = self.layout.service_type_dir(service_type).list_dir_names().await;
            for name in names {
                services.push(self.service(service_type, &name, &app_envs).await);
            }
        }
        services
    }

    async fn service(
        &self,
        service_type: ServiceType,
        name: &str,
        app_envs: &[(String, String)],
    ) -> Service {
        let (status, version) = match self
            .docker
            .inspect_state_image(&service_type.container_name(name))
            .await
        {
            Some((state, image)) => (ServiceStatus::from_state(&state), image_version(&image)),
            None => {
                debug!("No container for {} service {}", service_type, name);
                (ServiceStatus::Stopped, "unknown".to_string())
            }
        };

        let dsn = self
            .layout
            .service_env_file(service_type, name)
            .read_optional()
            .await
            .map(|contents| parse_env_file(&contents))
            .and_then(|vars| env_lookup(&vars, service_type.dsn_keys()))
            .unwrap_or_default();

        let link_host = service_type.link_host(name);
        let container = service_type.container_name(name);
        let linked_apps = app_envs
            .iter()
            .filter(|(_, env)| env.contains(&link_host) || env.contains(&container))
            .map(|(app, _)| app.clone())
            .collect();

        let dir = self.layout.service_dir(service_type, name);
        Service {
            name: name.to_string(),
            service_type,
            version,
            status,
            dsn: SecretString::from(dsn),
            linked_apps,
            config_dir: dir.subdir("config").path().display().to_string(),
            data_dir: self.layout.service_data_dir(service_type, name).path().display().to_string(),
        }
    }
}
