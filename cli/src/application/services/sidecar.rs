//! Small metadata files next to user data: `.version` and the template hashes.
//!
//! A missing sidecar reads as `None`, never as an error.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::ConfigLayout;
use crate::domain::template::MODE_DATA;

/// Read a sidecar's trimmed content. Empty files read as `None`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn read(fs: &impl LocalFs, path: &Path) -> Result<Option<String>> {
    if !fs.exists(path) {
        return Ok(None);
    }
    let text = fs
        .read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = text.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Atomically write `value` followed by a newline.
///
/// # Errors
///
/// Returns an error if the sidecar cannot be written.
pub fn write(fs: &impl LocalFs, path: &Path, value: &str) -> Result<()> {
    fs.write_atomic(path, format!("{value}\n").as_bytes(), MODE_DATA)
        .with_context(|| format!("writing {}", path.display()))
}

/// Version recorded by the last completed initialization or migration.
///
/// # Errors
///
/// Returns an error if `.version` exists but cannot be read.
pub fn installed_version(fs: &impl LocalFs, layout: &ConfigLayout) -> Result<Option<String>> {
    read(fs, &layout.version_file())
}

/// Record `version` as installed. This is the migration commit point.
///
/// # Errors
///
/// Returns an error if `.version` cannot be written.
pub fn set_installed_version(fs: &impl LocalFs, layout: &ConfigLayout, version: &str) -> Result<()> {
    write(fs, &layout.version_file(), version)
}

/// Compare `hash` against the sidecar at `path` and rewrite it when it differs.
///
/// Returns `true` if the sidecar changed (including when it was missing).
///
/// # Errors
///
/// Returns an error if the sidecar cannot be read or written.
pub fn refresh_hash(fs: &impl LocalFs, path: &Path, hash: &str) -> Result<bool> {
    if read(fs, path)?.as_deref() == Some(hash) {
        return Ok(false);
    }
    write(fs, path, hash)?;
    Ok(true)
}
