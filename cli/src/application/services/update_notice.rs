//! Throttled "a newer construct is available" check for gated commands.
//!
//! Never fails the calling command: remote errors are logged and dropped.

use std::time::SystemTime;

use crate::application::ports::{LocalFs, ReleaseSource};
use crate::application::services::{self_update, update_throttle};
use crate::domain::config::RuntimeConfig;
use crate::domain::{ConfigLayout, version};

/// Return the remote version when a check is due and it is newer than
/// `current`. The sentinel is touched whenever a check is attempted.
pub fn check(
    fs: &impl LocalFs,
    releases: &impl ReleaseSource,
    layout: &ConfigLayout,
    runtime: &RuntimeConfig,
    current: &str,
    now: SystemTime,
) -> Option<String> {
    match update_throttle::should_check(fs, layout, runtime, now) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            tracing::debug!(error = %e, "update throttle unreadable, skipping check");
            return None;
        }
    }
    if let Err(e) = update_throttle::record(fs, layout) {
        tracing::debug!(error = %e, "could not record update check");
    }
    match self_update::remote_version(releases, runtime.channel()) {
        Ok(remote) if version::is_newer(&remote, current) => Some(remote),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %format!("{e:#}"), "update check failed");
            None
        }
    }
}
