use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config.
///
/// The catalog points at a closed port so the startup listing fails fast
/// without reaching the network.
fn minimal_config(port: u16, db_dir: &TempDir) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[catalog]
api_key = "test-token"
base_url = "http://127.0.0.1:1"
timeout_secs = 2

[analytics]
database_path = "{}"
"#,
        port,
        db_dir.path().join("analytics.db").display()
    )
}

/// Write config content to a temp file
fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_cinescout"))
        .env("CINESCOUT_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Run the binary with the given config path and wait for it to exit.
async fn run_to_exit(config_path: &std::path::Path) -> std::process::Output {
    timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_cinescout"))
            .env("CINESCOUT_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command")
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();
    let db_dir = TempDir::new().unwrap();
    let temp_file = write_config(&minimal_config(port, &db_dir));

    // Start server
    let mut server = spawn_server(temp_file.path()).await;

    // Wait for server to be ready
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    // Test health endpoint
    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    // Cleanup
    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_returns_sanitized() {
    let port = get_available_port();
    let db_dir = TempDir::new().unwrap();
    let temp_file = write_config(&minimal_config(port, &db_dir));

    let mut server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["catalog"]["api_key_configured"], true);
    assert!(json["catalog"].get("api_key").is_none());

    server.kill().await.ok();
}

#[tokio::test]
async fn test_unreachable_catalog_reports_failure_state() {
    let port = get_available_port();
    let db_dir = TempDir::new().unwrap();
    let temp_file = write_config(&minimal_config(port, &db_dir));

    let mut server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let mut state = serde_json::Value::Null;
    for _ in 0..100 {
        state = client
            .get(format!("http://127.0.0.1:{}/api/v1/search", port))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        if state["phase"] == "failed" {
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(state["phase"], "failed");
    assert_eq!(
        state["error"],
        "Error fetching movies. Please try again later"
    );
    assert_eq!(state["is_loading"], false);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = run_to_exit(std::path::Path::new("/nonexistent/config.toml")).await;
    assert!(!result.status.success());
}

#[tokio::test]
async fn test_missing_catalog_section_exits_with_error() {
    let config_without_catalog = r#"
[server]
port = 8080
"#;
    let temp_file = write_config(config_without_catalog);

    let result = run_to_exit(temp_file.path()).await;
    assert!(!result.status.success());
}

#[tokio::test]
async fn test_blank_api_key_exits_with_error() {
    let config = r#"
[catalog]
api_key = "   "
"#;
    let temp_file = write_config(config);

    let result = run_to_exit(temp_file.path()).await;
    assert!(!result.status.success());
}
