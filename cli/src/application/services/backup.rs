//! Backups taken before the engine rewrites a user file.
//!
//! `<file>.backup` always holds the state immediately before the latest
//! write. An existing `.backup` is first rotated to
//! `<file>.backup.<yyyymmddhhmmss>`; backups are never deleted.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::application::ports::LocalFs;
use crate::domain::layout::{backup_path, with_suffix};

/// Snapshot `path` to `path.backup`, rotating any previous backup.
///
/// Returns the backup path, or `None` when `path` does not exist.
///
/// # Errors
///
/// Returns an error if the rotation or copy fails.
pub fn snapshot(fs: &impl LocalFs, path: &Path) -> Result<Option<PathBuf>> {
    if !fs.exists(path) {
        return Ok(None);
    }
    let backup = backup_path(path);
    if fs.exists(&backup) {
        let rotated = rotation_target(fs, &backup);
        fs.rename(&backup, &rotated)
            .with_context(|| format!("rotating {}", backup.display()))?;
        tracing::debug!(from = %backup.display(), to = %rotated.display(), "rotated backup");
    }
    fs.copy(path, &backup)
        .with_context(|| format!("backing up {}", path.display()))?;
    Ok(Some(backup))
}

/// Snapshot `path`, then atomically replace it with `bytes`.
///
/// # Errors
///
/// Returns an error if the snapshot or the write fails.
pub fn write_with_backup(
    fs: &impl LocalFs,
    path: &Path,
    bytes: &[u8],
    mode: u32,
) -> Result<Option<PathBuf>> {
    let backup = snapshot(fs, path)?;
    fs.write_atomic(path, bytes, mode)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(backup)
}

/// First free `<backup>.<timestamp>[-n]` name.
fn rotation_target(fs: &impl LocalFs, backup: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
    let base = with_suffix(backup, &format!(".{stamp}"));
    if !fs.exists(&base) {
        return base;
    }
    (1u32..)
        .map(|n| with_suffix(&base, &format!("-{n}")))
        .find(|candidate| !fs.exists(candidate))
        .unwrap_or(base)
}
