//! `construct sys migrate`: run the migration driver on demand.

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::Applied;
use crate::app::AppContext;
use crate::application::services::migration::PackagesPolicy;
use crate::application::services::sidecar;
use crate::application::services::version_gate::{self, GateDecision};
use crate::domain::version::CURRENT_VERSION;

/// How `packages.toml` is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackagesMode {
    /// Add newly declared defaults, keep everything else
    Additive,
    /// Rebuild from the template, keeping compatible user values
    Replace,
}

impl From<PackagesMode> for PackagesPolicy {
    fn from(mode: PackagesMode) -> Self {
        match mode {
            PackagesMode::Additive => Self::Additive,
            PackagesMode::Replace => Self::Replace,
        }
    }
}

/// Arguments for the migrate command.
#[derive(Args, Default)]
pub struct MigrateArgs {
    /// packages.toml policy (defaults to this release's policy)
    #[arg(long, value_enum)]
    pub packages: Option<PackagesMode>,
}

/// Run `construct sys migrate`.
///
/// An up-to-date tree is migrated again from its own version, which
/// refreshes container files and sidecars.
///
/// # Errors
///
/// Returns an error if any migration step fails.
pub async fn run(app: &AppContext, args: &MigrateArgs) -> Result<()> {
    let policy = args
        .packages
        .map_or_else(PackagesPolicy::for_release, PackagesPolicy::from);
    let from = match version_gate::evaluate(&app.fs, &app.layout, CURRENT_VERSION)? {
        GateDecision::FreshInstall => None,
        GateDecision::Migrate { from } => Some(from),
        GateDecision::UpToDate => Some(
            sidecar::installed_version(&app.fs, &app.layout)?
                .unwrap_or_else(|| CURRENT_VERSION.to_string()),
        ),
    };
    tracing::info!(?from, ?policy, "manual migration");

    match super::initialize_or_migrate(app, from.as_deref(), policy).await? {
        Applied::Initialized(report) => app.renderer().init(&report),
        Applied::Migrated(report) => app.renderer().migration(&report),
    }
}
