//! File-level reconciliation: parse, merge, back up, write.
//!
//! The user file is parsed before anything is written, so a malformed file
//! aborts without touching the tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml::Table;

use crate::application::ports::LocalFs;
use crate::application::services::backup;
use crate::domain::Template;
use crate::domain::reconcile::{self, merge_add_missing, merge_prefer_user};

/// What a reconciliation did to the file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Backup taken before the write, if the file existed.
    pub backup: Option<PathBuf>,
    /// Keys grafted in from the template (additive mode only).
    pub added: Vec<String>,
    /// Whether the file was (re)written.
    pub written: bool,
}

/// Mode A: rewrite `path` with the template's schema and the user's values.
///
/// A missing file is created from the template verbatim.
///
/// # Errors
///
/// Returns an error if either document fails to parse or the write fails.
pub fn prefer_user(fs: &impl LocalFs, path: &Path, template: &Template) -> Result<ReconcileOutcome> {
    if !fs.exists(path) {
        return write_template(fs, path, template);
    }
    let defaults = template_document(template)?;
    let user = user_document(fs, path)?;
    let merged = merge_prefer_user(&defaults, &user);
    let rendered = reconcile::render(&merged)?;
    let backup = backup::write_with_backup(fs, path, rendered.as_bytes(), template.mode)?;
    tracing::info!(path = %path.display(), "reconciled (prefer user)");
    Ok(ReconcileOutcome {
        backup,
        added: Vec::new(),
        written: true,
    })
}

/// Mode B: add template keys missing from `path`, keeping everything else.
///
/// The file is left untouched when nothing is missing. Added keys are listed
/// in a comment block attributed to `origin`.
///
/// # Errors
///
/// Returns an error if either document fails to parse or the write fails.
pub fn add_missing(
    fs: &impl LocalFs,
    path: &Path,
    template: &Template,
    origin: &str,
) -> Result<ReconcileOutcome> {
    if !fs.exists(path) {
        return write_template(fs, path, template);
    }
    let defaults = template_document(template)?;
    let user = user_document(fs, path)?;
    let (merged, added) = merge_add_missing(&defaults, &user);
    if added.is_empty() {
        return Ok(ReconcileOutcome::default());
    }
    let rendered = reconcile::render_annotated(&merged, &added, origin)?;
    let backup = backup::write_with_backup(fs, path, rendered.as_bytes(), template.mode)?;
    tracing::info!(path = %path.display(), added = added.len(), "reconciled (add missing)");
    Ok(ReconcileOutcome {
        backup,
        added,
        written: true,
    })
}

/// Template keys absent from the file at `path` (all of them if it is missing).
///
/// # Errors
///
/// Returns an error if either document fails to parse.
pub fn missing_keys(fs: &impl LocalFs, path: &Path, template: &Template) -> Result<Vec<String>> {
    let defaults = template_document(template)?;
    let user = if fs.exists(path) {
        user_document(fs, path)?
    } else {
        Table::new()
    };
    Ok(reconcile::missing_keys(&defaults, &user))
}

/// The template's defaults and the parsed user file at `path`.
///
/// # Errors
///
/// Returns an error if either document cannot be read or parsed.
pub fn documents(fs: &impl LocalFs, path: &Path, template: &Template) -> Result<(Table, Table)> {
    Ok((template_document(template)?, user_document(fs, path)?))
}

fn write_template(fs: &impl LocalFs, path: &Path, template: &Template) -> Result<ReconcileOutcome> {
    fs.write_atomic(path, template.bytes, template.mode)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "created from template");
    Ok(ReconcileOutcome {
        backup: None,
        added: Vec::new(),
        written: true,
    })
}

fn template_document(template: &Template) -> Result<Table> {
    let text = std::str::from_utf8(template.bytes)
        .with_context(|| format!("embedded template {} is not UTF-8", template.name))?;
    let label = PathBuf::from(format!("<embedded {}>", template.name));
    Ok(reconcile::parse_document(&label, text)?)
}

fn user_document(fs: &impl LocalFs, path: &Path) -> Result<Table> {
    let text = fs
        .read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(reconcile::parse_document(path, &text)?)
}
