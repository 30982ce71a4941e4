//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::SystemTime;

use anyhow::Result;

use crate::domain::install::Platform;
use crate::domain::{ConstructConfig, Template, UpdateChannel};

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Filesystem operations used by the engine.
///
/// Implementations must report permission failures so that
/// `EngineError::is_permission_denied` recognises them.
pub trait LocalFs {
    /// Whether anything (file, directory or symlink target) exists at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Read a whole file.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Write `path.tmp`, fsync, set `mode`, rename over `path`.
    fn write_atomic(&self, path: &Path, bytes: &[u8], mode: u32) -> Result<()>;
    /// Append text, creating the file (and its parents) if missing.
    fn append(&self, path: &Path, text: &str) -> Result<()>;
    /// Rename `from` to `to`, replacing `to`.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    /// Copy file contents from `from` to `to`.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
    /// Remove a file or symlink.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Create a directory and all parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Set unix permission bits (no-op elsewhere).
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;
    /// Modification time, `None` when the file does not exist.
    fn modified(&self, path: &Path) -> Result<Option<SystemTime>>;
    /// Create the file if missing and set its mtime to now.
    fn touch(&self, path: &Path) -> Result<()>;
    /// Target of a symlink, `None` if `path` is not a symlink.
    fn read_link(&self, path: &Path) -> Result<Option<PathBuf>>;
    /// Create a symlink at `link` pointing to `target`.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
    /// Resolve symlinks and relative components.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

// ── Template Port ─────────────────────────────────────────────────────────────

/// Read-only catalog of the templates compiled into the binary.
pub trait TemplateSource {
    /// Every template, in a stable order.
    fn templates(&self) -> &[Template];

    /// Look up one template by logical name.
    ///
    /// # Errors
    ///
    /// Returns an error if no template has that name.
    fn get(&self, name: &str) -> Result<&Template> {
        self.templates()
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| anyhow::anyhow!("embedded template not found: {name}"))
    }
}

// ── Container Runtime Port ────────────────────────────────────────────────────

/// Which runtimes removed the image and which had nothing to remove.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageRemoval {
    pub removed_by: Vec<String>,
    pub not_found_in: Vec<String>,
}

/// Image operations against the supported container runtimes.
#[allow(async_fn_in_trait)]
pub trait ContainerRuntime {
    /// Remove `image` from every runtime that has it. "Not found" is not an error.
    async fn remove_image(&self, image: &str) -> Result<ImageRemoval>;
    /// Build `image` from `context_dir`, returning the runtime used.
    async fn build_image(&self, image: &str, context_dir: &Path) -> Result<String>;
}

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Release Port ──────────────────────────────────────────────────────────────

/// Remote release metadata and artifacts.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseSource {
    /// Fetch the advertised version for `channel` (raw text, may carry `v`).
    fn latest_version(&self, channel: UpdateChannel) -> Result<String>;

    /// Download the release archive for `version` and extract the platform
    /// binary into `work_dir`, returning the path of the executable file.
    fn fetch_binary(&self, version: &str, platform: &Platform, work_dir: &Path) -> Result<PathBuf>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Loads the typed configuration.
pub trait ConfigStore {
    /// Load `config.toml`, returning defaults when it does not exist.
    fn load(&self) -> Result<ConstructConfig>;
    /// Location of `config.toml`.
    fn path(&self) -> PathBuf;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
