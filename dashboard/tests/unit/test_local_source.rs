//! Local data path tests over a temporary host layout

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tokio_test::assert_ok;

use dokku_dashboard::client::SourceKind;
use dokku_dashboard::models::app::ApplicationStatus;
use dokku_dashboard::models::report::MountPhase;
use dokku_dashboard::models::service::{ServiceStatus, ServiceType};
use dokku_dashboard::models::MASK;

use crate::common::{local_client, write_file, FakeRunner};

const APP_ONE_CONTAINER: &str = r#"{"ID":"5a2b3c4d5e6f","Image":"dokku/app-one:latest","Labels":"com.dokku.app-name=app-one,com.dokku.process-type=web","Names":"app-one.web.1","State":"running","Status":"Up 2 hours"}"#;

/// `home/` holds app-one (deployed, running) and app-three (created,
/// never deployed) next to dokku's own files; `services/` one redis
fn host_layout() -> TempDir {
    let dir = TempDir::new().unwrap();
    let home = dir.path().join("home");

    write_file(
        &home.join("app-one/ENV"),
        "export PORT=\"5000\"\nAPI_TOKEN='abc123'\n# comment\nREDIS_URL=redis://:pw@dokku-redis-cache:6379\nALPHA=first\n",
    );
    write_file(&home.join("app-one/VHOST"), "one.example.com\nwww.one.example.com\n");
    write_file(&home.join("app-one/DOKKU_SCALE"), "web=2\nworker=1\n");
    write_file(
        &home.join("app-one/DOCKER_OPTIONS_DEPLOY"),
        "--restart=on-failure:10\n-v /var/lib/dokku/data/storage/app-one:/app/storage\n",
    );
    write_file(
        &home.join("app-one/DOCKER_OPTIONS_RUN"),
        "-v /var/lib/dokku/data/storage/app-one:/app/storage\n",
    );
    std::fs::create_dir_all(home.join("app-three")).unwrap();

    // Platform state that is not an app
    std::fs::create_dir_all(home.join("tls")).unwrap();
    std::fs::create_dir_all(home.join(".ssh")).unwrap();
    write_file(&home.join("ENV"), "GLOBAL=1\n");
    write_file(&home.join("dokkurc"), "");

    write_file(
        &dir.path().join("services/redis/cache/ENV"),
        "REDIS_URL=redis://:hunter2@dokku-redis-cache:6379\n",
    );

    dir
}

fn docker_runner() -> FakeRunner {
    FakeRunner::new()
        .on("docker ps -a --filter label=com.dokku.app-name", APP_ONE_CONTAINER)
        .on("docker inspect dokku.redis.cache", "running|redis:7.2.4\n")
}

fn app_names(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root.join("home"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_list_apps_from_host_files() {
    let dir = host_layout();
    let runner = Arc::new(docker_runner());
    let client = local_client(dir.path(), runner.clone());
    assert_eq!(client.kind(), SourceKind::Local);

    let apps = client.list_apps().await;
    let names: Vec<&str> = apps.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["app-one", "app-three"]);

    assert_eq!(apps[0].status, ApplicationStatus::Running);
    assert_eq!(apps[0].container_count, 1);
    assert_eq!(apps[0].domains, vec!["one.example.com", "www.one.example.com"]);

    // Directory without containers is stopped, never running
    assert_eq!(apps[1].status, ApplicationStatus::Stopped);
    assert_eq!(apps[1].container_count, 0);
    assert!(apps[1].web_url.is_empty());

    // One container listing for the whole set, no dokku invocations
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_listing_is_idempotent() {
    let dir = host_layout();
    let client = local_client(dir.path(), Arc::new(docker_runner()));

    let before = app_names(dir.path());
    let first = client.list_apps().await;
    let second = client.list_apps().await;

    assert_eq!(first, second);
    assert_eq!(app_names(dir.path()), before);
}

#[tokio::test]
async fn test_missing_app_is_unknown() {
    let dir = host_layout();
    let client = local_client(dir.path(), Arc::new(FakeRunner::new()));

    let app = client.app_info("ghost").await;
    assert_eq!(app.status, ApplicationStatus::Unknown);
    assert!(app.domains.is_empty());
    assert_eq!(client.app_status("app-three").await, ApplicationStatus::Stopped);
}

#[tokio::test]
async fn test_env_sorted_and_masked() {
    let dir = host_layout();
    let client = local_client(dir.path(), Arc::new(FakeRunner::new()));

    let vars = client.config_list("app-one").await;
    let keys: Vec<&str> = vars.iter().map(|v| v.key.as_str()).collect();
    assert_eq!(keys, vec!["ALPHA", "API_TOKEN", "PORT", "REDIS_URL"]);

    assert_eq!(vars[1].value, "abc123");
    assert_eq!(vars[1].masked_value(), MASK);
    assert_eq!(vars[2].value, "5000");
    assert_eq!(vars[2].masked_value(), "5000");

    assert!(client.config_list("app-three").await.is_empty());
}

#[tokio::test]
async fn test_scaling_and_storage_from_files() {
    let dir = host_layout();
    let client = local_client(dir.path(), Arc::new(FakeRunner::new()));

    let scale = client.scaling("app-one").await;
    assert_eq!(scale.len(), 2);
    assert_eq!(scale[0].process_type, "web");
    assert_eq!(scale[0].quantity, 2);

    let mounts = client.storage("app-one").await;
    assert_eq!(mounts.len(), 1);
    assert_eq!(mounts[0].host_path, "/var/lib/dokku/data/storage/app-one");
    assert_eq!(mounts[0].container_path, "/app/storage");
    assert_eq!(mounts[0].phases, vec![MountPhase::Deploy, MountPhase::Run]);
}

#[tokio::test]
async fn test_scaling_falls_back_to_dokku() {
    let dir = host_layout();
    let runner = Arc::new(FakeRunner::new().on(
        "dokku ps:scale app-three",
        "-----> Scaling for app-three\nproctype: qty\n--------: ---\nweb:  1\n",
    ));
    let client = local_client(dir.path(), runner.clone());

    let scale = client.scaling("app-three").await;
    assert_eq!(scale.len(), 1);
    assert_eq!(scale[0].process_type, "web");
    assert!(runner.position("dokku ps:scale app-three").is_some());
}

#[tokio::test]
async fn test_services_from_host_files() {
    let dir = host_layout();
    let client = local_client(dir.path(), Arc::new(docker_runner()));

    let services = client.services().await;
    assert_eq!(services.len(), 1);

    let cache = &services[0];
    assert_eq!(cache.name, "cache");
    assert_eq!(cache.service_type, ServiceType::Redis);
    assert_eq!(cache.status, ServiceStatus::Running);
    assert_eq!(cache.version, "7.2.4");
    assert_eq!(cache.linked_apps, vec!["app-one"]);
    assert!(!cache.masked_dsn().contains("hunter2"));
}

#[tokio::test]
async fn test_control_uses_local_cli() {
    let dir = host_layout();
    let runner = Arc::new(
        FakeRunner::new()
            .on("dokku ps:start app-three", "-----> Starting app-three\n")
            .on("docker ps -a --filter label=com.dokku.app-name", ""),
    );
    let client = local_client(dir.path(), runner.clone());

    let outcome = assert_ok!(client.start("app-three").await);
    assert_eq!(outcome.output, "-----> Starting app-three");
    assert_eq!(outcome.app.name, "app-three");

    // Status is re-read only after the action returned
    let action = runner.position("dokku ps:start app-three").unwrap();
    let status = runner.position("docker ps").unwrap();
    assert!(action < status);
}

#[tokio::test]
async fn test_system_info_separates_missing_from_zero() {
    let dir = host_layout();
    let runner = Arc::new(
        FakeRunner::new()
            .on("dokku version", "dokku version 0.35.12\n")
            .on("docker info", "27.3.1\n")
            .on("docker ps -aq", "5a2b3c4d5e6f\n7f8e9d0c1b2a\n")
            .on("docker volume ls -q", ""),
    );
    let client = local_client(dir.path(), runner);

    let system = client.system_info().await;
    assert_eq!(system.dokku_version, "0.35.12");
    assert_eq!(system.docker_version.as_deref(), Some("27.3.1"));
    assert_eq!(system.app_count, 2);
    assert_eq!(system.container_count, Some(2));
    assert_eq!(system.volume_count, Some(0));
    // `docker images` failed
    assert_eq!(system.image_count, None);
}
