//! `construct sys doctor` against real config trees.

#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn construct(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("construct"));
    cmd.env("NO_COLOR", "1")
        .env("HOME", home)
        .env("CONSTRUCT_CONFIG_DIR", home.join("cfg"))
        .env("CONSTRUCT_VERSION_URL", "http://127.0.0.1:9/VERSION")
        .env("PATH", "");
    cmd
}

/// A current tree whose `config.toml` only sets the engine.
fn stripped_tree(home: &Path) {
    let cfg = home.join("cfg");
    std::fs::create_dir_all(&cfg).expect("mkdir");
    std::fs::write(cfg.join(".version"), format!("{VERSION}\n")).expect("seed");
    std::fs::write(cfg.join("config.toml"), "[runtime]\nengine = \"docker\"\n").expect("seed");
}

#[test]
fn test_doctor_lists_missing_defaults_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    stripped_tree(dir.path());

    construct(dir.path())
        .args(["sys", "doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default settings missing"))
        .stdout(predicate::str::contains("network.mode"))
        .stdout(predicate::str::contains("construct sys doctor --fix"));

    let config = std::fs::read_to_string(dir.path().join("cfg/config.toml")).expect("read");
    assert_eq!(config, "[runtime]\nengine = \"docker\"\n");
}

#[test]
fn test_doctor_fix_restores_defaults_with_backup() {
    let dir = tempfile::tempdir().expect("tempdir");
    stripped_tree(dir.path());

    construct(dir.path())
        .args(["sys", "doctor", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added network.mode"));

    let cfg = dir.path().join("cfg");
    let config = std::fs::read_to_string(cfg.join("config.toml")).expect("read");
    assert!(config.starts_with("# Added by construct sys doctor --fix:"), "{config}");
    assert!(config.contains("engine = \"docker\""));
    assert!(cfg.join("config.toml.backup").exists());

    construct(dir.path())
        .args(["sys", "doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All default settings present"));
}

#[test]
fn test_doctor_json_reports_findings() {
    let dir = tempfile::tempdir().expect("tempdir");
    stripped_tree(dir.path());

    let assert = construct(dir.path())
        .args(["sys", "doctor", "--json"])
        .assert()
        .success();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json");
    let missing = value["missing_keys"].as_array().expect("missing_keys");
    assert!(missing.iter().any(|k| k == "sandbox.shell"));
}
