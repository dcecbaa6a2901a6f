//! Log streaming tests against real processes

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_test::assert_err;

use dokku_dashboard::client::LogStream;
use dokku_dashboard::command::DokkuCommand;
use dokku_dashboard::process::{ProcessRunner, TokioProcessRunner};
use dokku_dashboard::remote::SshRunner;

use crate::common::{remote_client, ssh_target, FakeRunner};

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

async fn is_alive(pid: u32) -> bool {
    let output = TokioProcessRunner::new()
        .output("kill", &["-0".to_string(), pid.to_string()], Duration::from_secs(5))
        .await
        .unwrap();
    output.success()
}

#[tokio::test]
async fn test_dropping_stream_kills_process() {
    let runner = TokioProcessRunner::new();
    let lines = runner
        .stream("sh", &sh("echo first; while true; do echo tick; sleep 0.1; done"))
        .unwrap();
    let mut stream = LogStream::new("blog", lines);
    let pid = stream.pid().unwrap();

    let first = stream.next_line().await.unwrap();
    assert_eq!(first.message, "first");
    assert!(is_alive(pid).await);

    drop(stream);

    let mut alive = true;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if !is_alive(pid).await {
            alive = false;
            break;
        }
    }
    assert!(!alive, "process {} survived its stream", pid);
}

#[tokio::test]
async fn test_stream_ends_with_process() {
    let runner = TokioProcessRunner::new();
    let lines = runner
        .stream("sh", &sh("echo one; echo two >&2; echo three"))
        .unwrap();
    let stream = LogStream::new("blog", lines);

    let mut messages: Vec<String> = stream.map(|line| line.message).collect().await;
    messages.sort();
    assert_eq!(messages, vec!["one", "three", "two"]);
}

#[tokio::test]
async fn test_follow_over_ssh() {
    let runner = Arc::new(FakeRunner::new().streaming(&[
        "2026-03-04T05:06:07.123456789Z app[web.1]: GET / 200",
        "2026-03-04T05:06:08.000000000Z app[web.1]: WARN slow request",
    ]));
    let client = remote_client(runner.clone());

    let mut stream = client.logs_stream("blog", 50).await.unwrap();
    assert_eq!(stream.app(), "blog");

    let first = stream.next().await.unwrap();
    assert_eq!(first.message, "app[web.1]: GET / 200");
    assert_eq!(first.timestamp.to_rfc3339(), "2026-03-04T05:06:07.123456789+00:00");
    let second = stream.next().await.unwrap();
    assert_eq!(second.message, "app[web.1]: WARN slow request");
    assert!(stream.next().await.is_none());

    let call = runner.command_calls().pop().unwrap();
    assert!(call.contains(" -tt "));
    assert!(call.contains("ControlPath="));
    assert!(call.ends_with("logs blog -t -n 50"));

    // The stream's master connection goes away with it
    drop(stream);
    assert!(runner.wait_for_call("-O exit").await);
    assert!(runner.position("-O exit") > runner.position("logs blog"));
}

#[tokio::test]
async fn test_batch_stream_dropped_early() {
    let runner = Arc::new(FakeRunner::new().streaming(&["one", "two", "three"]));
    let ssh = SshRunner::new(ssh_target(), runner.clone());

    let batch = ssh.batch().await;
    assert!(batch.is_multiplexed());
    let mut lines = batch.stream(&DokkuCommand::logs("blog", 10, true)).unwrap();
    assert_eq!(lines.next_line().await.as_deref(), Some("one"));
    drop(lines);

    assert!(runner.wait_for_call("-O exit").await);
    let exits = runner.calls().iter().filter(|c| c.contains("-O exit")).count();
    assert_eq!(exits, 1);
}

#[tokio::test]
async fn test_follow_invalid_app_spawns_nothing() {
    let runner = Arc::new(FakeRunner::new().streaming(&["never"]));
    let client = remote_client(runner.clone());

    assert_err!(client.logs_stream("../etc", 10).await);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_recent_logs_over_ssh() {
    let runner = Arc::new(FakeRunner::new().on(
        "logs blog -n 2",
        "2026-03-04T05:06:07Z app[web.1]: ERROR boom\r\nplain line\n",
    ));
    let client = remote_client(runner);

    let lines = client.logs_recent("blog", 2).await;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].message, "app[web.1]: ERROR boom");
    assert_eq!(lines[1].message, "plain line");
}

#[tokio::test]
async fn test_recent_logs_clamped() {
    let runner = Arc::new(FakeRunner::new());
    let client = remote_client(runner.clone());

    client.logs_recent("blog", 0).await;
    client.logs_recent("blog", 50_000).await;

    assert!(runner.position("logs blog -n 1").is_some());
    assert!(runner.position("logs blog -n 10000").is_some());
}
