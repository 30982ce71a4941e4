//! `construct sys doctor`: report config drift, optionally repair it.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::doctor;
use crate::domain::version::CURRENT_VERSION;

/// Arguments for the doctor command.
#[derive(Args, Default)]
pub struct DoctorArgs {
    /// Add missing default keys to config.toml (a backup is kept)
    #[arg(long)]
    pub fix: bool,
}

/// Run `construct sys doctor`.
///
/// Findings never change the exit code; only I/O and parse failures do.
///
/// # Errors
///
/// Returns an error if `config.toml` cannot be read, parsed, or written.
pub fn run(app: &AppContext, args: &DoctorArgs) -> Result<()> {
    if args.fix {
        let reporter = app.reporter("Checking config.toml...");
        let outcome = doctor::repair(&app.fs, &app.templates, &reporter, &app.layout);
        reporter.finish();
        return app.renderer().repair(&outcome?);
    }
    let diagnosis = doctor::diagnose(&app.fs, &app.templates, &app.layout, CURRENT_VERSION)?;
    app.renderer().diagnosis(&diagnosis)
}
