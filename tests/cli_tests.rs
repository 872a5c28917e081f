//! Integration tests for the CLI interface
//!
//! Tests the main entry point, configuration failures, and exit status policy

mod common;

use assert_cmd::Command;
use common::{member_json, TOKEN};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command isolated from the caller's environment and config files
fn group_prune(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("group-prune").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("PRIVATE_TOKEN")
        .env_remove("LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help_flag() {
    let home = TempDir::new().unwrap();
    group_prune(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--group"));
}

#[test]
fn test_invalid_flag() {
    let home = TempDir::new().unwrap();
    group_prune(&home)
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_missing_config_file_is_fatal() {
    let home = TempDir::new().unwrap();
    group_prune(&home)
        .args(["--config", "absent.toml", "--yes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_invalid_config_value_is_fatal() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("group-prune.toml"), "per_page = 0\n").unwrap();

    group_prune(&home)
        .arg("--yes")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("per_page"));
}

#[test]
fn test_declining_exits_cleanly() {
    let home = TempDir::new().unwrap();
    group_prune(&home)
        .env("GROUP_PRUNE_API_URL", "http://127.0.0.1:9/api/v4")
        .write_stdin("no\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Execute group cleanup?"));
}

#[test]
fn test_empty_token_answer_is_fatal() {
    let home = TempDir::new().unwrap();
    group_prune(&home)
        .env("GROUP_PRUNE_API_URL", "http://127.0.0.1:9/api/v4")
        .write_stdin("yes\n\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("private token required"));
}

async fn server_with_failing_delete() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Eng"}])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v4/groups/1/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            member_json(10, "carol"),
            member_json(11, "ghost")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/groups/1/members/10"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/groups/1/members/11"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"404 Not found"}"#))
        .mount(&server)
        .await;

    server
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_member_failures_exit_zero_by_default() {
    let server = server_with_failing_delete().await;
    let home = TempDir::new().unwrap();

    group_prune(&home)
        .env("PRIVATE_TOKEN", TOKEN)
        .args(["--api-url", &format!("{}/api/v4", server.uri())])
        .args(["--yes", "--group", "Eng"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1, skipped 0, failed 1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fail_on_errors_exits_two() {
    let server = server_with_failing_delete().await;
    let home = TempDir::new().unwrap();

    let output = group_prune(&home)
        .env("PRIVATE_TOKEN", TOKEN)
        .args(["--api-url", &format!("{}/api/v4", server.uri())])
        .args(["--yes", "--group", "1", "--fail-on-errors", "--json"])
        .assert()
        .code(2)
        .get_output()
        .clone();

    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout is a JSON report");
    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    let failed: Vec<&Value> = outcomes
        .iter()
        .filter(|o| o["result"]["status"] == "failed")
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["member"]["username"], "ghost");
    assert!(failed[0]["result"]["error"]
        .as_str()
        .unwrap()
        .contains("404 Not found"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_logs_go_to_stderr() {
    let server = server_with_failing_delete().await;
    let home = TempDir::new().unwrap();

    group_prune(&home)
        .env("PRIVATE_TOKEN", TOKEN)
        .args(["--api-url", &format!("{}/api/v4", server.uri())])
        .args(["--yes", "--group", "Eng", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Calling out to").not())
        .stdout(predicate::str::starts_with("{"))
        .stderr(predicate::str::contains("Calling out to"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}
