//! Client facade tests

use std::sync::Arc;

use tokio_test::assert_ok;

use dokku_dashboard::client::SourceKind;
use dokku_dashboard::models::app::ApplicationStatus;
use dokku_dashboard::models::certificate::CertificateColor;

use crate::common::{remote_client, FakeRunner};

#[tokio::test]
async fn test_restart_then_resolve() {
    let runner = Arc::new(
        FakeRunner::new()
            .on("ps:restart blog", "-----> Restarting app blog\n")
            .on("ps:report blog", "=====> blog ps information\n       Processes: 2\n       Running: true\n")
            .on("domains:report blog", "       Domains app vhosts: blog.example.com\n")
            .on("git:report blog", "       Git deploy branch: main\n"),
    );
    let client = remote_client(runner.clone());
    assert_eq!(client.kind(), SourceKind::Remote);

    let outcome = assert_ok!(client.restart("blog").await);
    assert_eq!(outcome.output, "-----> Restarting app blog");
    assert_eq!(outcome.app.status, ApplicationStatus::Running);
    assert_eq!(outcome.app.container_count, 2);
    assert_eq!(outcome.app.deploy_source, "main");
    assert_eq!(outcome.app.web_url, "https://blog.example.com");

    let action = runner.position("ps:restart blog").unwrap();
    let status = runner.position("ps:report blog").unwrap();
    assert!(action < status);
}

#[tokio::test]
async fn test_certificates_sorted_by_expiry() {
    let runner = Arc::new(FakeRunner::new().on(
        "letsencrypt:list",
        "\
-----> App name           Certificate Expiry        Time before expiry        Time before renewal
shop                      2026-01-20 05:25:37       39d, 8h, 3m, 2s           9d, 8h, 3m, 2s
blog                      2025-12-01 10:00:00       3d, 1h, 0m, 0s            0d, 0h, 0m, 0s
docs                      2026-04-01 00:00:00       90d, 0h, 0m, 0s           60d, 0h, 0m, 0s
",
    ));
    let client = remote_client(runner);

    let certs = client.certificates().await;
    let names: Vec<&str> = certs.iter().map(|c| c.app_name.as_str()).collect();
    assert_eq!(names, vec!["blog", "shop", "docs"]);

    assert_eq!(certs[0].days_until_expiry, 3);
    assert_eq!(certs[0].status_color(), CertificateColor::Red);
    assert_eq!(certs[2].status_color(), CertificateColor::Green);
    assert!(certs.iter().all(|c| c.auto_renew));
}

#[tokio::test]
async fn test_plugins_and_system_info() {
    let runner = Arc::new(
        FakeRunner::new()
            .on(
                "plugin:list",
                "  00_dokku-standard    0.35.12 enabled    dokku core standard plugin\n  letsencrypt          0.20.4 disabled   Automated installation of let's encrypt TLS certificates\n",
            )
            .on("version", "dokku version 0.35.12\n")
            .on("apps:list", "=====> My Apps\nblog\nshop\n"),
    );
    let client = remote_client(runner);

    let plugins = client.plugins().await;
    assert_eq!(plugins.len(), 2);
    assert!(plugins[0].enabled);
    assert!(!plugins[1].enabled);
    assert_eq!(plugins[1].version, "0.20.4");

    let system = client.system_info().await;
    assert_eq!(system.dokku_version, "0.35.12");
    assert_eq!(system.app_count, 2);
    // Docker is not reachable through dokku over ssh
    assert!(system.docker_version.is_none());
    assert!(system.container_count.is_none());
    assert!(system.image_count.is_none());
    assert!(system.volume_count.is_none());
    assert!(system.host.is_none());

    let json = serde_json::to_value(&system).unwrap();
    assert!(json["docker_version"].is_null());
    assert!(json["container_count"].is_null());
}

#[tokio::test]
async fn test_detail_collects_every_section() {
    let runner = Arc::new(
        FakeRunner::new()
            .on("config:show blog", "=====> blog env vars\nPORT: 5000\n")
            .on("ps:scale blog", "-----> Scaling for blog\nproctype: qty\n--------: ---\nweb:  2\n")
            .on(
                "ports:report blog",
                "=====> blog ports information\n       Ports map:                     http:80:5000 https:443:5000\n",
            )
            .on(
                "storage:report blog",
                "=====> blog storage information\n       Storage deploy mounts:         -v /var/lib/dokku/data/storage/blog:/app/storage\n",
            )
            .on(
                "checks:report blog",
                "=====> blog checks information\n       Checks disabled list:          none\n       Checks skipped list:           worker\n",
            ),
    );
    let client = remote_client(runner);

    let detail = client.app_detail("blog").await;
    assert_eq!(detail.app.name, "blog");
    // ps:report failed: the rest still arrives
    assert_eq!(detail.app.status, ApplicationStatus::Unknown);
    assert_eq!(detail.config.len(), 1);
    assert_eq!(detail.scaling.len(), 1);
    assert_eq!(detail.network.port_mappings.len(), 2);
    assert_eq!(detail.network.port_mappings[1].host_port, 443);
    assert_eq!(detail.storage.len(), 1);
    assert!(detail.health.disabled.is_empty());
    assert_eq!(detail.health.skipped, vec!["worker"]);
    assert!(!detail.ssl.enabled);
}
