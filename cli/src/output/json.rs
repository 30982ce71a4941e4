//! JSON output for `--json`.
//!
//! Every renderer prints one pretty-printed object on stdout. Failures use
//! the error object from [`format_error`].

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::application::services::doctor::Diagnosis;
use crate::application::services::migration::{InitReport, MigrationReport};
use crate::application::services::reconcile::ReconcileOutcome;
use crate::application::services::self_update::{AliasOutcome, SelfUpdateOutcome};
use crate::domain::ConstructConfig;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stateless JSON renderer.
pub struct JsonRenderer;

fn emit(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization failed")?
    );
    Ok(())
}

fn path_value(path: Option<&Path>) -> Value {
    path.map_or(Value::Null, |p| Value::String(p.display().to_string()))
}

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        emit(&json!({ "version": version }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_init(&self, report: &InitReport) -> Result<()> {
        emit(&json!({
            "initialized": true,
            "version": report.version,
            "files": report.files,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_migration(&self, report: &MigrationReport) -> Result<()> {
        emit(&json!({
            "migrated": true,
            "from": report.from,
            "to": report.to,
            "container_files": report.container_files,
            "config_backup": path_value(report.config_backup.as_deref()),
            "packages_added": report.packages_added,
            "script_regenerated": report.script_regenerated,
            "image_removed_by": report.images.removed_by,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_diagnosis(&self, diagnosis: &Diagnosis) -> Result<()> {
        let invalid: Vec<Value> = diagnosis
            .invalid_values
            .iter()
            .map(|e| match e {
                crate::domain::ConfigError::InvalidValue { key, value, valid } => {
                    json!({ "key": key, "value": value, "valid": valid })
                }
            })
            .collect();
        emit(&json!({
            "healthy": diagnosis.is_healthy(),
            "current_version": diagnosis.current,
            "installed_version": diagnosis.installed,
            "config_present": diagnosis.config_present,
            "missing_keys": diagnosis.missing_keys,
            "invalid_values": invalid,
            "rebuild_required": {
                "present": diagnosis.marker.present,
                "reason": diagnosis.marker.reason,
            },
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_repair(&self, outcome: &ReconcileOutcome) -> Result<()> {
        emit(&json!({
            "written": outcome.written,
            "added": outcome.added,
            "backup": path_value(outcome.backup.as_deref()),
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_self_update(&self, outcome: &SelfUpdateOutcome) -> Result<()> {
        let value = match outcome {
            SelfUpdateOutcome::AlreadyLatest { installed, remote } => json!({
                "updated": false,
                "installed": installed,
                "remote": remote,
            }),
            SelfUpdateOutcome::Installed(report) => json!({
                "updated": true,
                "from": report.from,
                "to": report.to,
                "target": report.target.display().to_string(),
                "user_local": report.user_local,
                "path_updated": path_value(report.path_updated.as_deref()),
                "alias": report.alias.as_ref().map(|a| match a {
                    AliasOutcome::Created => "created",
                    AliasOutcome::Replaced { .. } => "replaced",
                    AliasOutcome::Unchanged => "unchanged",
                    AliasOutcome::Conflict { .. } => "conflict",
                }),
            }),
        };
        emit(&value)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(&self, config: &ConstructConfig, path: &Path) -> Result<()> {
        let settings = serde_json::to_value(config).context("serializing config")?;
        emit(&json!({
            "path": path.display().to_string(),
            "config": settings,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_rebuild(&self, engine: &str) -> Result<()> {
        emit(&json!({ "rebuilt": true, "engine": engine }))
    }
}
