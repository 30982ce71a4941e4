//! Command implementations

pub mod config;
pub mod doctor;
pub mod migrate;
pub mod rebuild;
pub mod self_update;
pub mod version;

use std::time::SystemTime;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::migration::{InitReport, MigrationReport, Migrator, PackagesPolicy};
use crate::application::services::update_notice;
use crate::application::services::version_gate::{self, GateDecision};
use crate::domain::ConstructConfig;
use crate::domain::version::CURRENT_VERSION;
use crate::infra::command_runner::DEFAULT_CMD_TIMEOUT;
use crate::infra::release::NOTICE_TIMEOUT;

/// Result of bringing the config tree up to date.
pub(crate) enum Applied {
    Initialized(InitReport),
    Migrated(MigrationReport),
}

/// Typed config for choosing runtimes and channels, tolerating a file the
/// current schema cannot read yet.
pub(crate) fn load_config_or_default(app: &AppContext) -> ConstructConfig {
    app.load_config().unwrap_or_else(|e| {
        tracing::debug!(error = %format!("{e:#}"), "using default config");
        ConstructConfig::default()
    })
}

/// Initialize the tree (`from` is `None`) or migrate it from `from`.
pub(crate) async fn initialize_or_migrate(
    app: &AppContext,
    from: Option<&str>,
    policy: PackagesPolicy,
) -> Result<Applied> {
    let config = load_config_or_default(app);
    let runtime = app.runtime(&config, DEFAULT_CMD_TIMEOUT);
    let reporter = app.reporter("Preparing construct config...");
    let migrator = Migrator::new(
        &app.fs,
        &app.templates,
        &runtime,
        &reporter,
        &app.layout,
        CURRENT_VERSION,
    );
    let result = match from {
        None => migrator.initialize().map(Applied::Initialized),
        Some(from) => migrator.migrate(from, policy).await.map(Applied::Migrated),
    };
    reporter.finish();
    result
}

/// Version gate for every command that reads the config tree.
///
/// # Errors
///
/// Returns an error if initialization or migration fails; `.version` is
/// left unchanged so the next invocation retries.
pub async fn ensure_current(app: &AppContext) -> Result<()> {
    let from = match version_gate::evaluate(&app.fs, &app.layout, CURRENT_VERSION)? {
        GateDecision::UpToDate => return Ok(()),
        GateDecision::FreshInstall => None,
        GateDecision::Migrate { from } => Some(from),
    };
    initialize_or_migrate(app, from.as_deref(), PackagesPolicy::for_release()).await?;
    Ok(())
}

/// Throttled update notice on stderr. Never fails the command.
pub fn notify_if_newer(app: &AppContext) {
    let config = load_config_or_default(app);
    let releases = app.releases().with_timeout(NOTICE_TIMEOUT);
    if let Some(remote) = update_notice::check(
        &app.fs,
        &releases,
        &app.layout,
        &config.runtime,
        CURRENT_VERSION,
        SystemTime::now(),
    ) {
        app.renderer().update_notice(&remote);
    }
}
