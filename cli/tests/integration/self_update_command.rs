//! `construct sys self-update` failure paths (no network in tests).

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn construct(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("construct"));
    cmd.env("NO_COLOR", "1")
        .env("HOME", home)
        .env("CONSTRUCT_CONFIG_DIR", home.join("cfg"))
        .env("CONSTRUCT_VERSION_URL", "http://127.0.0.1:9/VERSION")
        .env("CONSTRUCT_RELEASES_URL", "http://127.0.0.1:9/releases");
    cmd
}

#[test]
fn test_unreachable_release_host_exits_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    construct(dir.path())
        .args(["sys", "self-update"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("network error"))
        .stderr(predicate::str::contains("127.0.0.1:9"));
}

#[test]
fn test_unreachable_release_host_json_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let assert = construct(dir.path())
        .args(["sys", "self-update", "--json"])
        .assert()
        .code(1);
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "network_error");
}

#[test]
fn test_self_update_does_not_touch_config_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _ = construct(dir.path()).args(["sys", "self-update"]).assert();
    assert!(!dir.path().join("cfg").exists());
}
