//! Cross-invocation signal that the container image must be rebuilt.
//!
//! The launch path checks [`get`] before starting a container, rebuilds when
//! the marker is present, then calls [`clear`].

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::ConfigLayout;
use crate::domain::template::MODE_DATA;

/// Reason recorded when the caller supplies none.
pub const DEFAULT_REASON: &str = "rebuild required";

/// Current marker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerState {
    pub reason: String,
    pub present: bool,
}

/// Read the marker.
///
/// # Errors
///
/// Returns an error if the marker exists but cannot be read.
pub fn get(fs: &impl LocalFs, layout: &ConfigLayout) -> Result<MarkerState> {
    let path = layout.rebuild_marker();
    if !fs.exists(&path) {
        return Ok(MarkerState {
            reason: String::new(),
            present: false,
        });
    }
    let reason = fs
        .read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(MarkerState {
        reason: reason.trim().to_string(),
        present: true,
    })
}

/// Write the marker with `reason` (or [`DEFAULT_REASON`] when empty).
///
/// # Errors
///
/// Returns an error if the marker cannot be written.
pub fn set(fs: &impl LocalFs, layout: &ConfigLayout, reason: &str) -> Result<()> {
    let reason = if reason.trim().is_empty() {
        DEFAULT_REASON
    } else {
        reason.trim()
    };
    let path = layout.rebuild_marker();
    fs.write_atomic(&path, format!("{reason}\n").as_bytes(), MODE_DATA)
        .with_context(|| format!("writing {}", path.display()))
}

/// Remove the marker; absence is fine.
///
/// # Errors
///
/// Returns an error if the marker exists but cannot be removed.
pub fn clear(fs: &impl LocalFs, layout: &ConfigLayout) -> Result<()> {
    let path = layout.rebuild_marker();
    if fs.exists(&path) {
        fs.remove_file(&path)
            .with_context(|| format!("removing {}", path.display()))?;
    }
    Ok(())
}
