//! End-to-end CLI tests for the edu-downloader binary.

mod support;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use support::socket_guard::start_mock_server_or_skip;
use support::{mount_bytes, mount_page};
use tempfile::TempDir;

/// Binary command isolated from any user config file.
fn cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("edu-downloader").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .env("COLUMNS", "120");
    cmd
}

#[test]
fn test_binary_without_input_warns_and_exits_zero() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Example: edu-downloader -u"));
}

#[test]
fn test_binary_help_displays_usage() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--list-file"))
        .stdout(predicate::str::contains("--interactive"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_empty_url_list_exits_one() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .args(["-u", " , ,"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No valid URLs provided"));
}

#[test]
fn test_binary_unreadable_list_file_counts_as_no_urls() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .args(["-f", "/definitely/not/here/urls.txt"])
        .assert()
        .code(1);
}

#[test]
fn test_binary_rejects_invalid_config_file() {
    let config_home = TempDir::new().unwrap();
    let dir = config_home.path().join("edu-downloader");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "concurrency = 0\n").unwrap();

    cmd(&config_home)
        .args(["-u", "https://example.test/page"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}

#[test]
fn test_binary_interactive_exit() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .arg("-i")
        .write_stdin("0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Enter URLs"));
}

#[tokio::test]
async fn test_binary_downloads_and_prints_tables() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let uri = mock_server.uri();
    mount_page(&mock_server, "/course/1", &[format!("{uri}/files/notes.pdf")]).await;
    mount_bytes(&mock_server, "/files/notes.pdf", 200, b"notes").await;
    let config_home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let page = format!("{uri}/course/1");
    let out_arg = out.path().display().to_string();

    let output = tokio::task::spawn_blocking(move || {
        cmd(&config_home)
            .args(["-u", &page, "-o", &out_arg, "-q"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Total files  1"))
        .stdout(predicate::str::contains("success (200)"));
    assert!(out.path().join("notes.pdf").is_file());
}

#[tokio::test]
async fn test_binary_json_report() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let uri = mock_server.uri();
    mount_page(&mock_server, "/course/1", &[format!("{uri}/files/gone.pdf")]).await;
    mount_bytes(&mock_server, "/files/gone.pdf", 404, b"").await;
    let config_home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let page = format!("{uri}/course/1");
    let out_arg = out.path().display().to_string();

    let output = tokio::task::spawn_blocking(move || {
        cmd(&config_home)
            .args(["-u", &page, "-o", &out_arg, "--json"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["summary"]["failed"], 1);
    assert_eq!(report["results"][0]["status"], "failure");
    assert_eq!(report["results"][0]["code"], 404);
}
