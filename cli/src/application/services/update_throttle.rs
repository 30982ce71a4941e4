//! Rate limit for remote version checks, keyed on a sentinel file's mtime.
//!
//! No locking: concurrent invocations may both decide a check is due.

use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::ConfigLayout;
use crate::domain::config::RuntimeConfig;

/// `true` iff checks are enabled and the sentinel is missing or older than
/// the configured interval.
///
/// # Errors
///
/// Returns an error if the sentinel's metadata cannot be read.
pub fn should_check(
    fs: &impl LocalFs,
    layout: &ConfigLayout,
    runtime: &RuntimeConfig,
    now: SystemTime,
) -> Result<bool> {
    if !runtime.auto_update_check {
        return Ok(false);
    }
    let sentinel = layout.update_check_sentinel();
    let Some(last) = fs
        .modified(&sentinel)
        .with_context(|| format!("reading {}", sentinel.display()))?
    else {
        return Ok(true);
    };
    // A sentinel from the future (clock skew) counts as fresh.
    let elapsed = now.duration_since(last).unwrap_or_default();
    Ok(elapsed > runtime.update_interval())
}

/// Record that a check happened now.
///
/// # Errors
///
/// Returns an error if the sentinel cannot be created or touched.
pub fn record(fs: &impl LocalFs, layout: &ConfigLayout) -> Result<()> {
    let sentinel = layout.update_check_sentinel();
    fs.touch(&sentinel)
        .with_context(|| format!("touching {}", sentinel.display()))
}
