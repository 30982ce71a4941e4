//! `construct sys self-update`: replace the running binary.

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::self_update::{self as service, InstallEnv, SelfUpdateOutcome, UpdatePlan};
use crate::domain::install::Platform;
use crate::domain::version::CURRENT_VERSION;

/// Arguments for the self-update command.
#[derive(Args, Default)]
pub struct SelfUpdateArgs {
    /// Reinstall even when already on the latest version
    #[arg(long)]
    pub force: bool,
}

/// Run `construct sys self-update`.
///
/// # Errors
///
/// Returns an error if the release cannot be fetched or installed anywhere.
pub async fn run(app: &AppContext, args: &SelfUpdateArgs) -> Result<()> {
    let config = super::load_config_or_default(app);
    let channel = config.runtime.channel();
    let releases = app.releases();

    let outcome = match service::plan(&releases, channel, CURRENT_VERSION, args.force)? {
        UpdatePlan::AlreadyLatest { installed, remote } => {
            SelfUpdateOutcome::AlreadyLatest { installed, remote }
        }
        UpdatePlan::Install { remote } => {
            let prompt = format!("Update construct {CURRENT_VERSION} → {remote}?");
            if !app.confirm(&prompt, true)? {
                app.output.info("Update cancelled.");
                return Ok(());
            }

            let work = tempfile::tempdir().context("creating download directory")?;
            let env = InstallEnv {
                home: app.home.clone(),
                shell: std::env::var("SHELL").unwrap_or_default(),
                current_exe: std::env::current_exe().context("locating the running binary")?,
                platform: Platform::current()?,
                work_dir: work.path().to_path_buf(),
            };
            let reporter = app.reporter("Downloading...");
            let installed = service::install(
                &app.fs,
                &releases,
                &reporter,
                &env,
                CURRENT_VERSION,
                &remote,
            );
            reporter.finish();
            SelfUpdateOutcome::Installed(installed?)
        }
    };
    app.renderer().self_update(&outcome)
}
