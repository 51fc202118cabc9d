//! End-to-end CLI tests using `assert_cmd`
#![cfg_attr(
    test,
    allow(
        deprecated,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::tests_outside_test_module,
        reason = "Test allows"
    )
)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get cargo binary or fail test
fn cargo_bin() -> Command {
    Command::cargo_bin("facepalm").unwrap_or_else(|err| panic!("Binary not found: {err}"))
}

/// Helper to create temp dir or fail test
fn temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|err| panic!("Failed to create temp dir: {err}"))
}

/// Binary configured to keep all state inside `temp`, without latency
fn isolated(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin();
    cmd.arg("--config")
        .arg(temp.path().join("config.toml"))
        .arg("--storage-dir")
        .arg(temp.path().join("storage"))
        .arg("--delay-ms")
        .arg("0");
    cmd
}

#[test]
fn test_cli_help() {
    cargo_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_invalid_command() {
    cargo_bin().arg("invalid-command-xyz").assert().failure();
}

#[test]
fn test_config_created_on_first_run() {
    let temp = temp_dir();
    isolated(&temp).args(["session", "show"]).assert().success();

    let config = fs::read_to_string(temp.path().join("config.toml"))
        .unwrap_or_else(|err| panic!("Config not written: {err}"));
    assert!(config.contains("request_delay_ms"));
}

#[test]
fn test_replay_login_and_posts() {
    let temp = temp_dir();
    let script = temp.path().join("requests.jsonl");
    fs::write(
        &script,
        concat!(
            r#"{"method":"GET","url":"/api/posts"}"#,
            "\n",
            r#"{"method":"POST","url":"/api/auth/login","body":{"username":"test","password":"bad"}}"#,
            "\n",
            r#"{"method":"GET","url":"/api/posts/42"}"#,
            "\n",
            r#"{"method":"GET","url":"/api/profile"}"#,
            "\n",
        ),
    )
    .unwrap_or_else(|err| panic!("Failed to write script: {err}"));

    isolated(&temp)
        .arg("replay")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":200"#))
        .stdout(predicate::str::contains(r#""error":"Unauthorized""#))
        .stdout(predicate::str::contains(r#""error":"Not Found""#))
        .stdout(predicate::str::contains(r#""passThrough":true"#));
}

#[test]
fn test_replay_from_stdin() {
    let temp = temp_dir();
    isolated(&temp)
        .args(["replay", "-"])
        .write_stdin(
            r#"{"method":"POST","url":"/auth/register","body":{"username":"alice","password":"p"}}"#,
        )
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"success""#))
        .stdout(predicate::str::contains(r#""username":"alice""#));
}

#[test]
fn test_remembered_login_persists_session() {
    let temp = temp_dir();
    isolated(&temp)
        .args(["replay", "-"])
        .write_stdin(
            r#"{"method":"POST","url":"/auth/login","body":{"username":"test","password":"test","rememberMe":true}}"#,
        )
        .assert()
        .success();

    isolated(&temp)
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""username":"test""#));

    isolated(&temp)
        .args(["session", "clear"])
        .assert()
        .success();

    isolated(&temp)
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));
}

#[test]
fn test_unremembered_login_is_not_persisted() {
    let temp = temp_dir();
    isolated(&temp)
        .args(["replay", "-"])
        .write_stdin(
            r#"{"method":"POST","url":"/auth/login","body":{"username":"test","password":"test"}}"#,
        )
        .assert()
        .success();

    isolated(&temp)
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));
}

#[test]
fn test_username_availability() {
    let temp = temp_dir();
    isolated(&temp)
        .args(["username", "neo", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"username_available_response""#))
        .stdout(predicate::str::contains(r#""available":false"#))
        .stdout(predicate::str::contains(r#""available":true"#));
}

#[test]
fn test_replay_rejects_invalid_script() {
    let temp = temp_dir();
    isolated(&temp)
        .args(["replay", "-"])
        .write_stdin("this is not json\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line 1"));
}

#[test]
fn test_replay_accepts_lowercase_method() {
    let temp = temp_dir();
    isolated(&temp)
        .args(["replay", "-"])
        .write_stdin(r#"{"method":"get","url":"/api/posts/1"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":200"#))
        .stdout(predicate::str::contains(r#""title":"What is the facepalm?""#));
}
