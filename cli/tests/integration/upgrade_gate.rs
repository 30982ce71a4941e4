//! The version gate and `sys migrate` as seen from the binary.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A sandboxed `HOME` with the config tree under `cfg/`.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn cfg(&self, rel: &str) -> PathBuf {
        self.dir.path().join("cfg").join(rel)
    }

    fn seed(&self, rel: &str, content: &str) {
        let path = self.cfg(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, content).expect("seed");
    }

    fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.cfg(rel)).expect("read")
    }

    fn construct(&self) -> Command {
        construct_in(self.dir.path())
    }
}

fn construct_in(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("construct"));
    cmd.env("NO_COLOR", "1")
        .env("HOME", home)
        .env("CONSTRUCT_CONFIG_DIR", home.join("cfg"))
        .env("CONSTRUCT_VERSION_URL", "http://127.0.0.1:9/VERSION")
        .env("CONSTRUCT_RELEASES_URL", "http://127.0.0.1:9/releases")
        .env("PATH", "")
        .env_remove("CONSTRUCT_LOG");
    cmd
}

#[test]
fn test_first_gated_command_initializes_tree() {
    let sandbox = Sandbox::new();
    sandbox
        .construct()
        .args(["sys", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("runtime.engine:"));

    assert_eq!(sandbox.read(".version"), format!("{VERSION}\n"));
    for rel in [
        "config.toml",
        "packages.toml",
        "container/Dockerfile",
        "container/entrypoint.sh",
        "container/install_user_packages.sh",
        ".entrypoint_template_hash",
    ] {
        assert!(sandbox.cfg(rel).exists(), "missing {rel}");
    }
    assert!(!sandbox.cfg(".rebuild_required").exists());
}

#[test]
fn test_gate_migrates_older_tree() {
    let sandbox = Sandbox::new();
    let legacy = "[runtime]\nengine = \"podman\"\n\n[legacy]\nflag = true\n";
    sandbox.seed(".version", "0.0.9\n");
    sandbox.seed("config.toml", legacy);
    sandbox.seed("home/.bashrc", "export EDITOR=vim\n");

    sandbox.construct().args(["sys", "config"]).assert().success();

    assert_eq!(sandbox.read(".version"), format!("{VERSION}\n"));
    assert_eq!(sandbox.read("config.toml.backup"), legacy);
    let config = sandbox.read("config.toml");
    assert!(config.contains("engine = \"podman\""), "{config}");
    assert!(!config.contains("legacy"), "{config}");
    assert!(sandbox.read(".rebuild_required").contains("0.0.9"));
    assert_eq!(sandbox.read("home/.bashrc"), "export EDITOR=vim\n");
}

#[test]
fn test_broken_config_fails_without_committing() {
    let sandbox = Sandbox::new();
    sandbox.seed(".version", "0.0.9\n");
    sandbox.seed("config.toml", "[runtime\nengine = \"docker\"\n");

    sandbox
        .construct()
        .args(["sys", "config"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("config.toml"));

    assert_eq!(sandbox.read(".version"), "0.0.9\n");
    assert_eq!(sandbox.read("config.toml"), "[runtime\nengine = \"docker\"\n");
}

#[test]
fn test_manual_migrate_on_fresh_tree_initializes() {
    let sandbox = Sandbox::new();
    sandbox
        .construct()
        .args(["sys", "migrate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("\"version\": \"{VERSION}\"")));
    assert!(sandbox.cfg("config.toml").exists());
}

#[test]
fn test_manual_migrate_replace_rebuilds_packages() {
    let sandbox = Sandbox::new();
    sandbox.seed(".version", &format!("{VERSION}\n"));
    sandbox.seed("config.toml", "[runtime]\nengine = \"docker\"\n");
    sandbox.seed(
        "packages.toml",
        "[apt]\npackages = [\"htop\"]\n\n[snap]\npackages = [\"code\"]\n",
    );

    sandbox
        .construct()
        .args(["sys", "migrate", "--packages", "replace"])
        .assert()
        .success();

    let packages = sandbox.read("packages.toml");
    assert!(packages.contains("htop"), "{packages}");
    assert!(!packages.contains("snap"), "{packages}");
    assert!(sandbox.read("container/install_user_packages.sh").contains("'htop'"));
    assert!(sandbox.cfg(".rebuild_required").exists());
}

#[test]
fn test_rebuild_without_runtime_keeps_marker() {
    let sandbox = Sandbox::new();
    sandbox.construct().args(["sys", "migrate"]).assert().success();
    sandbox.seed(".rebuild_required", "test\n");

    sandbox
        .construct()
        .args(["sys", "rebuild"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no container runtime found"));
    assert!(sandbox.cfg(".rebuild_required").exists());
}
