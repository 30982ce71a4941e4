//! Application service: config tree diagnosis and missing-defaults repair.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::{LocalFs, ProgressReporter, TemplateSource};
use crate::application::services::reconcile::{self, ReconcileOutcome};
use crate::application::services::rebuild_marker::{self, MarkerState};
use crate::application::services::sidecar;
use crate::domain::config;
use crate::domain::template::names;
use crate::domain::{ConfigError, ConfigLayout};

/// Origin recorded in the annotation block of a repaired file.
pub const REPAIR_ORIGIN: &str = "construct sys doctor --fix";

/// Findings of a read-only diagnosis.
#[derive(Debug)]
pub struct Diagnosis {
    pub current: String,
    pub installed: Option<String>,
    pub config_present: bool,
    /// Template keys absent from `config.toml`.
    pub missing_keys: Vec<String>,
    pub invalid_values: Vec<ConfigError>,
    pub marker: MarkerState,
}

impl Diagnosis {
    /// Whether anything needs the user's attention.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.config_present && self.missing_keys.is_empty() && self.invalid_values.is_empty()
    }
}

/// Inspect the tree without writing anything.
///
/// # Errors
///
/// Returns an error if `config.toml` or a sidecar exists but cannot be read,
/// or if `config.toml` is not valid TOML. Values of the wrong type are
/// reported in [`Diagnosis::invalid_values`] instead.
pub fn diagnose(
    fs: &impl LocalFs,
    templates: &impl TemplateSource,
    layout: &ConfigLayout,
    current: &str,
) -> Result<Diagnosis> {
    let path = layout.config_toml();
    let config_present = fs.exists(&path);
    let template = templates.get(names::CONFIG)?;
    let missing_keys = reconcile::missing_keys(fs, &path, template)?;

    let invalid_values = if config_present {
        let (defaults, user) = reconcile::documents(fs, &path, template)?;
        config::check_document(&defaults, &user)
    } else {
        Vec::new()
    };

    let diagnosis = Diagnosis {
        current: current.to_string(),
        installed: sidecar::installed_version(fs, layout)?,
        config_present,
        missing_keys,
        invalid_values,
        marker: rebuild_marker::get(fs, layout)?,
    };
    tracing::debug!(
        missing = diagnosis.missing_keys.len(),
        invalid = diagnosis.invalid_values.len(),
        "diagnosis complete"
    );
    Ok(diagnosis)
}

/// Graft missing template defaults into `config.toml` (Mode B).
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or written.
pub fn repair(
    fs: &impl LocalFs,
    templates: &impl TemplateSource,
    reporter: &impl ProgressReporter,
    layout: &ConfigLayout,
) -> Result<ReconcileOutcome> {
    reporter.step("Restoring missing defaults in config.toml...");
    let template = templates.get(names::CONFIG)?;
    let outcome = reconcile::add_missing(fs, &layout.config_toml(), template, REPAIR_ORIGIN)?;
    if outcome.written {
        reporter.success(&format!("Added {} missing keys", outcome.added.len()));
    } else {
        reporter.success("config.toml already has every default");
    }
    Ok(outcome)
}
