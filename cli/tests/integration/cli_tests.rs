//! Argument parsing, help and version output.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn construct() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("construct"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    construct().assert().code(2).stderr(predicate::str::contains(
        "Reproducible, network-restricted sandboxes for AI coding agents",
    ));
}

#[test]
fn test_cli_help_lists_sys() {
    construct()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("sys"));
}

#[test]
fn test_sys_help_lists_maintenance_commands() {
    let assert = construct().args(["sys", "--help"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for command in ["version", "migrate", "self-update", "doctor", "rebuild", "config"] {
        assert!(stdout.contains(command), "missing {command} in:\n{stdout}");
    }
}

#[test]
fn test_cli_version_flag_shows_version() {
    construct()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("construct {VERSION}")));
}

#[test]
fn test_sys_version_prints_binary_version() {
    let dir = tempfile::tempdir().expect("tempdir");
    construct()
        .env("HOME", dir.path())
        .env("CONSTRUCT_CONFIG_DIR", dir.path().join("cfg"))
        .args(["sys", "version"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("construct {VERSION}\n")));
    // Ungated: the config tree is not created.
    assert!(!dir.path().join("cfg").exists());
}

#[test]
fn test_sys_version_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let assert = construct()
        .env("HOME", dir.path())
        .env("CONSTRUCT_CONFIG_DIR", dir.path().join("cfg"))
        .args(["sys", "version", "--json"])
        .assert()
        .success();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json");
    assert_eq!(value["version"], VERSION);
}

#[test]
fn test_unknown_packages_policy_is_rejected() {
    construct()
        .args(["sys", "migrate", "--packages", "merge"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("additive"));
}
