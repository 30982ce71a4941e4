//! Startup decision: initialize, migrate, or carry on.

use anyhow::Result;

use crate::application::ports::LocalFs;
use crate::application::services::sidecar;
use crate::domain::ConfigLayout;
use crate::domain::version::{self, PRE_VERSIONING_BASELINE};

/// What the gate decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No `.version` and no `config.toml`: materialize everything.
    FreshInstall,
    /// The tree was written by an older version (or predates `.version`).
    Migrate { from: String },
    /// Installed version is current (or newer, e.g. after a downgrade).
    UpToDate,
}

/// Evaluate the gate for the binary version `current`.
///
/// # Errors
///
/// Returns an error if `.version` exists but cannot be read.
pub fn evaluate(fs: &impl LocalFs, layout: &ConfigLayout, current: &str) -> Result<GateDecision> {
    let decision = match sidecar::installed_version(fs, layout)? {
        None if fs.exists(&layout.config_toml()) => GateDecision::Migrate {
            from: PRE_VERSIONING_BASELINE.to_string(),
        },
        None => GateDecision::FreshInstall,
        Some(installed) if version::is_newer(current, &installed) => {
            GateDecision::Migrate { from: installed }
        }
        Some(installed) => {
            if version::is_newer(&installed, current) {
                tracing::warn!(%installed, %current, "config tree was written by a newer construct");
            }
            GateDecision::UpToDate
        }
    };
    tracing::debug!(?decision, %current, "version gate");
    Ok(decision)
}
