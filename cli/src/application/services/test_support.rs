//! Shared test doubles for service tests.
//!
//! Provides a reporter that discards output, a recording container runtime,
//! and a filesystem wrapper that injects write or permission failures.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;

use crate::application::ports::{ContainerRuntime, ImageRemoval, LocalFs, ProgressReporter};
use crate::domain::EngineError;
use crate::infra::fs::StdFs;

/// Build an `ExitStatus` from a logical exit code.
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn output(code: i32, stdout: &[u8], stderr: &[u8]) -> std::process::Output {
    std::process::Output {
        status: exit_status(code),
        stdout: stdout.to_vec(),
        stderr: stderr.to_vec(),
    }
}

pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

/// Records `remove_image` calls; fails them when `fail` is set.
#[derive(Default)]
pub struct RecordingRuntime {
    pub removed: RefCell<Vec<String>>,
    pub fail: bool,
}

impl ContainerRuntime for RecordingRuntime {
    async fn remove_image(&self, image: &str) -> Result<ImageRemoval> {
        self.removed.borrow_mut().push(image.to_string());
        if self.fail {
            anyhow::bail!("docker daemon unreachable");
        }
        Ok(ImageRemoval {
            removed_by: vec!["docker".to_string()],
            not_found_in: Vec::new(),
        })
    }

    async fn build_image(&self, _: &str, _: &Path) -> Result<String> {
        anyhow::bail!("not expected")
    }
}

/// [`StdFs`] with injected faults.
#[derive(Default)]
pub struct FaultyFs {
    /// `write_atomic` to a file with this name fails.
    pub fail_write_named: Option<&'static str>,
    /// Mutations below this directory fail with permission denied.
    pub deny_under: Option<PathBuf>,
    /// Restrict `deny_under` to these operations (all when `None`).
    pub deny_ops: Option<&'static [&'static str]>,
    /// Number of injected failures so far.
    pub hits: RefCell<u32>,
}

impl FaultyFs {
    pub fn failing_write(file_name: &'static str) -> Self {
        Self {
            fail_write_named: Some(file_name),
            ..Self::default()
        }
    }

    /// Only copies below `dir` fail; renames and removals still succeed.
    pub fn denying_copy(dir: impl Into<PathBuf>) -> Self {
        Self {
            deny_under: Some(dir.into()),
            deny_ops: Some(&["copy onto"]),
            ..Self::default()
        }
    }

    fn guard(&self, op: &'static str, path: &Path) -> Result<()> {
        let op_denied = self.deny_ops.is_none_or(|ops| ops.contains(&op));
        if op_denied && self.deny_under.as_deref().is_some_and(|dir| path.starts_with(dir)) {
            *self.hits.borrow_mut() += 1;
            return Err(EngineError::Permission {
                op,
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }
            .into());
        }
        Ok(())
    }
}

impl LocalFs for FaultyFs {
    fn exists(&self, path: &Path) -> bool {
        StdFs.exists(path)
    }
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        StdFs.read(path)
    }
    fn read_to_string(&self, path: &Path) -> Result<String> {
        StdFs.read_to_string(path)
    }
    fn write_atomic(&self, path: &Path, bytes: &[u8], mode: u32) -> Result<()> {
        if self.fail_write_named.is_some()
            && path.file_name().and_then(|n| n.to_str()) == self.fail_write_named
        {
            *self.hits.borrow_mut() += 1;
            anyhow::bail!("injected failure writing {}", path.display());
        }
        self.guard("write", path)?;
        StdFs.write_atomic(path, bytes, mode)
    }
    fn append(&self, path: &Path, text: &str) -> Result<()> {
        self.guard("append to", path)?;
        StdFs.append(path, text)
    }
    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.guard("rename", from)?;
        self.guard("rename onto", to)?;
        StdFs.rename(from, to)
    }
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.guard("copy onto", to)?;
        StdFs.copy(from, to)
    }
    fn remove_file(&self, path: &Path) -> Result<()> {
        self.guard("remove", path)?;
        StdFs.remove_file(path)
    }
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if !StdFs.exists(path) {
            self.guard("create", path)?;
        }
        StdFs.create_dir_all(path)
    }
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.guard("chmod", path)?;
        StdFs.set_permissions(path, mode)
    }
    fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
        StdFs.modified(path)
    }
    fn touch(&self, path: &Path) -> Result<()> {
        self.guard("touch", path)?;
        StdFs.touch(path)
    }
    fn read_link(&self, path: &Path) -> Result<Option<PathBuf>> {
        StdFs.read_link(path)
    }
    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.guard("link", link)?;
        StdFs.symlink(target, link)
    }
    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        StdFs.canonicalize(path)
    }
}
