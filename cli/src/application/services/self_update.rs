//! Application service: replace the running binary with the latest release.
//!
//! The running binary is only ever replaced by a rename-out, copy-in
//! sequence with the previous binary kept at `<target>.backup` until the new
//! one is in place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, ProgressReporter, ReleaseSource};
use crate::domain::install::{
    ALIAS_NAME, BINARY_NAME, PATH_MARKER, Platform, ShellKind, is_package_manager_path,
    user_local_target,
};
use crate::domain::layout::backup_path;
use crate::domain::template::MODE_EXEC;
use crate::domain::version;
use crate::domain::{EngineError, UpdateChannel};

// ── Public types ──────────────────────────────────────────────────────────────

/// Process facts the engine needs, gathered by the caller.
#[derive(Debug, Clone)]
pub struct InstallEnv {
    pub home: PathBuf,
    /// Value of `SHELL`, empty when unset.
    pub shell: String,
    pub current_exe: PathBuf,
    pub platform: Platform,
    /// Scratch directory for the download; removed by the caller.
    pub work_dir: PathBuf,
}

/// What happened to the `ct` alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasOutcome {
    Created,
    /// Previously pointed into a package-manager prefix.
    Replaced { previous: PathBuf },
    Unchanged,
    /// Owned by something else; left alone.
    Conflict { target: PathBuf },
}

/// Details of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub from: String,
    pub to: String,
    pub target: PathBuf,
    pub user_local: bool,
    /// Shell startup file that gained the `PATH` line on this run.
    pub path_updated: Option<PathBuf>,
    pub alias: Option<AliasOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfUpdateOutcome {
    /// Remote is not newer and `--force` was not given.
    AlreadyLatest { installed: String, remote: String },
    Installed(InstallReport),
}

// ── Version check ─────────────────────────────────────────────────────────────

/// Fetch the remote version for `channel`, cleaned of `v` and whitespace.
///
/// # Errors
///
/// Returns an error if the version file cannot be fetched.
pub fn remote_version(releases: &impl ReleaseSource, channel: UpdateChannel) -> Result<String> {
    let raw = releases
        .latest_version(channel)
        .with_context(|| format!("checking the {} channel", channel.as_str()))?;
    Ok(version::clean(&raw))
}

// ── Self-update ───────────────────────────────────────────────────────────────

/// Whether an install should happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    Install { remote: String },
    AlreadyLatest { installed: String, remote: String },
}

/// Compare the remote version against `current`. `force` always installs.
///
/// # Errors
///
/// Returns an error if the version file cannot be fetched.
pub fn plan(
    releases: &impl ReleaseSource,
    channel: UpdateChannel,
    current: &str,
    force: bool,
) -> Result<UpdatePlan> {
    let remote = remote_version(releases, channel)?;
    if force || version::is_newer(&remote, current) {
        return Ok(UpdatePlan::Install { remote });
    }
    tracing::debug!(%remote, %current, "already latest");
    Ok(UpdatePlan::AlreadyLatest {
        installed: current.to_string(),
        remote,
    })
}

/// Download `remote` and install it over the running binary, falling back to
/// `~/.local/bin` once on a permission failure.
///
/// # Errors
///
/// Returns an error if the download fails, the archive has no binary, or
/// the install fails at every target tried.
pub fn install(
    fs: &impl LocalFs,
    releases: &impl ReleaseSource,
    reporter: &impl ProgressReporter,
    env: &InstallEnv,
    current: &str,
    remote: &str,
) -> Result<InstallReport> {
    reporter.step(&format!("Downloading construct {remote}..."));
    let binary = releases
        .fetch_binary(remote, &env.platform, &env.work_dir)
        .context("downloading release")?;
    if !fs.exists(&binary) {
        return Err(EngineError::Integrity {
            expected: env.platform.binary_entry(),
        }
        .into());
    }

    let (mut target, mut user_local) = resolve_target(fs, env);
    tracing::info!(target = %target.display(), user_local, "installing");
    reporter.step(&format!("Installing to {}...", target.display()));
    if let Err(err) = install_atomic(fs, &binary, &target) {
        if user_local || !EngineError::is_permission_denied(&err) {
            return Err(err);
        }
        reporter.warn(&format!(
            "No write access to {}, installing to ~/.local/bin instead",
            target.display()
        ));
        tracing::warn!(error = %format!("{err:#}"), "falling back to user-local install");
        target = user_local_target(&env.home);
        user_local = true;
        install_atomic(fs, &binary, &target)?;
    }

    let (path_updated, alias) = if user_local {
        let path_updated = ensure_path_entry(fs, &env.home, &env.shell)?;
        let alias = ensure_alias(fs, &target)?;
        if let AliasOutcome::Conflict { target: foreign } = &alias {
            let conflict = EngineError::Conflict {
                link: target.with_file_name(ALIAS_NAME),
                target: foreign.clone(),
            };
            tracing::warn!(%conflict, "alias conflict");
            reporter.warn(&conflict.to_string());
        }
        (path_updated, Some(alias))
    } else {
        (None, None)
    };

    reporter.success(&format!("Installed construct {remote} to {}", target.display()));
    Ok(InstallReport {
        from: current.to_string(),
        to: remote.to_string(),
        target,
        user_local,
        path_updated,
        alias,
    })
}

/// Resolved running binary, or the user-local target when the binary lives
/// in a package-manager prefix.
fn resolve_target(fs: &impl LocalFs, env: &InstallEnv) -> (PathBuf, bool) {
    let resolved = fs
        .canonicalize(&env.current_exe)
        .unwrap_or_else(|_| env.current_exe.clone());
    if is_package_manager_path(&resolved) {
        (user_local_target(&env.home), true)
    } else {
        (resolved, false)
    }
}

/// Replace `target` with `new_binary`, restoring the previous binary on failure.
///
/// # Errors
///
/// Returns the original install error; a failed restore is logged, not returned.
pub fn install_atomic(fs: &impl LocalFs, new_binary: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs.create_dir_all(parent)?;
    }
    let backup = backup_path(target);
    let had_previous = fs.exists(target);
    if had_previous {
        fs.rename(target, &backup)?;
    }

    let installed = fs
        .copy(new_binary, target)
        .and_then(|()| fs.set_permissions(target, MODE_EXEC));

    match installed {
        Ok(()) => {
            if had_previous && let Err(e) = fs.remove_file(&backup) {
                tracing::warn!(error = %e, backup = %backup.display(), "could not remove binary backup");
            }
            Ok(())
        }
        Err(err) => {
            if fs.exists(target) && let Err(e) = fs.remove_file(target) {
                tracing::warn!(error = %e, "could not remove partial binary");
            }
            if had_previous && let Err(restore) = fs.rename(&backup, target) {
                tracing::error!(
                    error = %restore,
                    target = %target.display(),
                    backup = %backup.display(),
                    "CRITICAL: failed to restore the previous binary; restore it manually from the backup"
                );
            }
            Err(err.context(format!("installing {}", target.display())))
        }
    }
}

/// Append the `PATH` snippet to the shell startup file unless the marker is
/// already there. Returns the file written, if any.
fn ensure_path_entry(fs: &impl LocalFs, home: &Path, shell: &str) -> Result<Option<PathBuf>> {
    let Some(kind) = ShellKind::from_env(shell) else {
        tracing::warn!(%shell, "unknown shell; add ~/.local/bin to PATH manually");
        return Ok(None);
    };
    let file = kind.config_file(home, fs.exists(&home.join(".bashrc")));
    if fs.exists(&file) {
        let text = fs
            .read_to_string(&file)
            .with_context(|| format!("reading {}", file.display()))?;
        if text.contains(PATH_MARKER) {
            return Ok(None);
        }
    }
    fs.append(&file, &kind.path_snippet())
        .with_context(|| format!("updating {}", file.display()))?;
    tracing::info!(file = %file.display(), "added ~/.local/bin to PATH");
    Ok(Some(file))
}

fn ensure_alias(fs: &impl LocalFs, binary: &Path) -> Result<AliasOutcome> {
    let link = binary.with_file_name(ALIAS_NAME);
    match fs.read_link(&link)? {
        Some(current) if current == binary || current == Path::new(BINARY_NAME) => {
            Ok(AliasOutcome::Unchanged)
        }
        Some(current) if is_package_manager_path(&current) => {
            fs.remove_file(&link)?;
            fs.symlink(binary, &link)?;
            Ok(AliasOutcome::Replaced { previous: current })
        }
        Some(current) => Ok(AliasOutcome::Conflict { target: current }),
        None if fs.exists(&link) => Ok(AliasOutcome::Conflict { target: link }),
        None => {
            fs.symlink(binary, &link)?;
            Ok(AliasOutcome::Created)
        }
    }
}
