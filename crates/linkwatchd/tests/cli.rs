//! End-to-end runs of the `linkwatch` binary.
//!
//! A local axum server plays both the monitored target and the Pushover
//! API; `true`/`false` stand in for the reboot command.

#![cfg(unix)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::process::Output;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Router};

#[derive(Clone)]
struct FakeApi {
    received: Arc<Mutex<Vec<HashMap<String, String>>>>,
    status: StatusCode,
}

impl FakeApi {
    fn priorities(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|fields| fields["priority"].clone())
            .collect()
    }
}

async fn record(
    State(api): State<FakeApi>,
    Form(fields): Form<HashMap<String, String>>,
) -> StatusCode {
    api.received.lock().unwrap().push(fields);
    api.status
}

async fn spawn_server(api_status: StatusCode) -> (SocketAddr, FakeApi) {
    let api = FakeApi {
        received: Arc::default(),
        status: api_status,
    };
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/1/messages.json", post(record))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, api)
}

/// Base environment: Pushover pointed at the fake API, fast retries.
fn base_env(addr: SocketAddr) -> Vec<(&'static str, String)> {
    vec![
        ("NOTIFICATION_TYPE", "pushover".to_string()),
        ("PUSHOVER_TOKEN", "app-token".to_string()),
        ("PUSHOVER_USER", "user-key".to_string()),
        ("PUSHOVER_API_URL", format!("http://{addr}/1/messages.json")),
        ("TARGET_URL", format!("http://{addr}/ok")),
        ("TIMEOUT", "2".to_string()),
        ("MAX_RETRIES", "2".to_string()),
        ("RETRY_DELAY", "0".to_string()),
        ("REBOOT_COMMAND", "true".to_string()),
    ]
}

fn with(mut env: Vec<(&'static str, String)>, key: &'static str, value: &str) -> Vec<(&'static str, String)> {
    env.retain(|(k, _)| *k != key);
    env.push((key, value.to_string()));
    env
}

async fn linkwatch(args: &[&str], env: &[(&'static str, String)]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_linkwatch"))
        .args(args)
        .env_clear()
        .env("PATH", std::env::var_os("PATH").unwrap_or_default())
        .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
        .output()
        .await
        .expect("failed to run linkwatch")
}

const UNREACHABLE: &str = "http://127.0.0.1:1/";

#[tokio::test]
async fn reachable_target_exits_zero_without_alerts() {
    let (addr, api) = spawn_server(StatusCode::OK).await;

    let out = linkwatch(&[], &base_env(addr)).await;

    assert_eq!(out.status.code(), Some(0));
    assert!(api.priorities().is_empty());
}

#[tokio::test]
async fn unreachable_target_alerts_then_reboots() {
    let (addr, api) = spawn_server(StatusCode::OK).await;
    let env = with(base_env(addr), "TARGET_URL", UNREACHABLE);

    let out = linkwatch(&["run"], &env).await;

    assert_eq!(out.status.code(), Some(0));
    // Exhaustion warning, then the pre-reboot notice.
    assert_eq!(api.priorities(), vec!["1", "1"]);
    let received = api.received.lock().unwrap();
    assert!(received[0]["message"].contains("attempt 2/2"));
    assert!(received[1]["message"].contains("being rebooted"));
}

#[tokio::test]
async fn failed_reboot_exits_four_with_critical_alert() {
    let (addr, api) = spawn_server(StatusCode::OK).await;
    let env = with(base_env(addr), "TARGET_URL", UNREACHABLE);
    let env = with(env, "REBOOT_COMMAND", "false");

    let out = linkwatch(&[], &env).await;

    assert_eq!(out.status.code(), Some(4));
    assert_eq!(api.priorities(), vec!["1", "1", "2"]);
}

#[tokio::test]
async fn broken_alert_channel_does_not_change_exit_status() {
    let (addr, api) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let env = with(base_env(addr), "TARGET_URL", UNREACHABLE);

    let out = linkwatch(&[], &env).await;
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(api.priorities().len(), 2);

    let env = with(env, "REBOOT_COMMAND", "false");
    let out = linkwatch(&[], &env).await;
    assert_eq!(out.status.code(), Some(4));
}

#[tokio::test]
async fn malformed_numbers_exit_one_with_critical_alert() {
    let (addr, api) = spawn_server(StatusCode::OK).await;
    let env = with(base_env(addr), "TIMEOUT", "five");

    let out = linkwatch(&[], &env).await;

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("TIMEOUT"));
    assert_eq!(api.priorities(), vec!["2"]);
    let received = api.received.lock().unwrap();
    assert!(received[0]["message"].starts_with("Script execution failed:"));
    assert!(received[0]["message"].contains("TIMEOUT"));
}

#[tokio::test]
async fn lost_config_alert_is_logged() {
    let (addr, api) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let env = with(base_env(addr), "MAX_RETRIES", "0");

    let out = linkwatch(&[], &env).await;

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(api.priorities(), vec!["2"]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("notification not delivered"));
}

#[tokio::test]
async fn unknown_channel_exits_one_without_alert() {
    let (addr, api) = spawn_server(StatusCode::OK).await;
    let env = with(base_env(addr), "NOTIFICATION_TYPE", "carrier-pigeon");

    let out = linkwatch(&[], &env).await;

    assert_eq!(out.status.code(), Some(1));
    assert!(api.priorities().is_empty());
}

#[tokio::test]
async fn check_with_malformed_numbers_never_alerts() {
    let (addr, api) = spawn_server(StatusCode::OK).await;
    let env = with(base_env(addr), "RETRY_DELAY", "soon");

    let out = linkwatch(&["check"], &env).await;

    assert_eq!(out.status.code(), Some(1));
    assert!(api.priorities().is_empty());
}

#[tokio::test]
async fn config_file_is_overridden_by_environment() {
    let (addr, api) = spawn_server(StatusCode::OK).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linkwatch.toml");
    std::fs::write(&path, format!("target_url = \"{UNREACHABLE}\"\nmax_retries = 1\n")).unwrap();

    // File alone: unreachable target, one attempt, reboot.
    let mut env = base_env(addr);
    env.retain(|(k, _)| *k != "TARGET_URL" && *k != "MAX_RETRIES");
    let out = linkwatch(&["--config", path.to_str().unwrap()], &env).await;
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(api.priorities().len(), 2);

    // Environment wins over the file: reachable, no alerts.
    let env = with(env, "TARGET_URL", &format!("http://{addr}/ok"));
    let out = linkwatch(&["--config", path.to_str().unwrap()], &env).await;
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(api.priorities().len(), 2);
}

#[tokio::test]
async fn log_file_receives_output() {
    let (addr, _api) = spawn_server(StatusCode::OK).await;
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("connectivity.log");
    let env = with(base_env(addr), "LOG_PATH", log.to_str().unwrap());

    let out = linkwatch(&[], &env).await;
    assert_eq!(out.status.code(), Some(0));

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("starting connectivity check"));
    assert!(contents.contains("INFO"));
}

#[tokio::test]
async fn check_requires_credentials() {
    let (addr, _api) = spawn_server(StatusCode::OK).await;
    let env = with(base_env(addr), "PUSHOVER_USER", "");

    let out = linkwatch(&["check"], &env).await;

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("PUSHOVER_USER"));
}

#[tokio::test]
async fn check_passes_and_never_alerts_by_default() {
    let (addr, api) = spawn_server(StatusCode::OK).await;

    let out = linkwatch(&["check"], &base_env(addr)).await;
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("SUCCESS: Connected"));
    assert!(api.priorities().is_empty());

    let out = linkwatch(&["check", "--notify"], &base_env(addr)).await;
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(api.priorities(), vec!["0"]);
}

#[tokio::test]
async fn check_fails_on_unreachable_target_without_rebooting() {
    let (addr, api) = spawn_server(StatusCode::OK).await;
    let env = with(base_env(addr), "TARGET_URL", UNREACHABLE);
    let env = with(env, "REBOOT_COMMAND", "false");

    let out = linkwatch(&["check"], &env).await;

    assert_eq!(out.status.code(), Some(1));
    assert!(api.priorities().is_empty());
}
