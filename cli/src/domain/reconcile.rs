//! Three-way reconciliation of a user TOML document against template defaults.
//!
//! Two modes:
//! - [`merge_prefer_user`] locks the schema to the template and keeps every
//!   user value whose type is compatible with the template default.
//! - [`merge_add_missing`] keeps the user document as-is and grafts in the
//!   template keys it lacks.
//!
//! Arrays are always replaced whole, never merged element-wise. Output table
//! order is the sorted key order of `toml::Table`.

use std::path::Path;

use anyhow::{Context, Result};
use toml::{Table, Value};

use crate::domain::error::{ConfigError, EngineError};

/// Parse a TOML document, attributing syntax errors to `path`.
///
/// # Errors
///
/// Returns [`EngineError::Parse`] if `text` is not valid TOML.
pub fn parse_document(path: &Path, text: &str) -> Result<Table, EngineError> {
    text.parse::<Table>().map_err(|e| EngineError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Serialize a document.
///
/// # Errors
///
/// Returns an error if the table cannot be represented as TOML.
pub fn render(doc: &Table) -> Result<String> {
    toml::to_string(doc).context("serializing TOML document")
}

/// Serialize a document preceded by a comment block naming `added` keys.
///
/// # Errors
///
/// Returns an error if the table cannot be represented as TOML.
pub fn render_annotated(doc: &Table, added: &[String], origin: &str) -> Result<String> {
    let body = render(doc)?;
    if added.is_empty() {
        return Ok(body);
    }
    let mut out = format!("# Added by {origin}:\n");
    for key in added {
        out.push_str("#   ");
        out.push_str(key);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&body);
    Ok(out)
}

/// Mode A: the result has exactly the template's keys.
///
/// For each key, the backup value wins when its type is compatible with the
/// template default; otherwise the template default wins. An empty template
/// table is an open map (for example `[claude.cc]`) and keeps the backup's
/// contents verbatim.
#[must_use]
pub fn merge_prefer_user(template: &Table, backup: &Table) -> Table {
    let mut merged = Table::new();
    for (key, default) in template {
        let value = match (default, backup.get(key)) {
            (Value::Table(t), Some(Value::Table(b))) if t.is_empty() => Value::Table(b.clone()),
            (Value::Table(t), Some(Value::Table(b))) => Value::Table(merge_prefer_user(t, b)),
            (Value::Array(_), Some(Value::Array(b))) => Value::Array(b.clone()),
            (d, Some(b)) if is_compatible_scalar(d, b) => b.clone(),
            (d, _) => d.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Mode B: the backup plus every template key it lacks.
///
/// Returns the merged document and the dotted paths of the added keys. A
/// table missing entirely from the backup contributes each of its leaves.
#[must_use]
pub fn merge_add_missing(template: &Table, backup: &Table) -> (Table, Vec<String>) {
    let mut added = Vec::new();
    let merged = add_missing_at(template, backup, "", &mut added);
    (merged, added)
}

/// Dotted paths of template keys absent from `doc`, without changing it.
#[must_use]
pub fn missing_keys(template: &Table, doc: &Table) -> Vec<String> {
    merge_add_missing(template, doc).1
}

/// Leaves of `doc` whose value kind differs from the template default.
///
/// Keys the template does not name are ignored, as is the content of open
/// (empty) template tables. A negative integer where the default is a
/// non-negative integer is reported too, since counts and intervals are
/// unsigned in the typed view.
#[must_use]
pub fn type_mismatches(template: &Table, doc: &Table) -> Vec<ConfigError> {
    let mut out = Vec::new();
    mismatches_at(template, doc, "", &mut out);
    out
}

fn mismatches_at(template: &Table, doc: &Table, prefix: &str, out: &mut Vec<ConfigError>) {
    for (key, default) in template {
        let Some(user) = doc.get(key) else {
            continue;
        };
        let path = join_path(prefix, key);
        match (default, user) {
            (Value::Table(t), Value::Table(u)) => mismatches_at(t, u, &path, out),
            (Value::Integer(d), Value::Integer(u)) if *d >= 0 && *u < 0 => {
                out.push(mismatch(path, user, "an integer >= 0".to_string()));
            }
            (d, u) if d.type_str() == u.type_str() => {}
            (d, u) => out.push(mismatch(path, u, format!("{} (like the default {d})", d.type_str()))),
        }
    }
}

fn mismatch(key: String, value: &Value, valid: String) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        valid,
    }
}

fn add_missing_at(template: &Table, backup: &Table, prefix: &str, added: &mut Vec<String>) -> Table {
    let mut merged = backup.clone();
    for (key, default) in template {
        let path = join_path(prefix, key);
        match (default, merged.get_mut(key)) {
            (Value::Table(t), Some(Value::Table(b))) => {
                let nested = add_missing_at(t, b, &path, added);
                *b = nested;
            }
            (_, Some(_)) => {}
            (d, None) => {
                collect_leaves(d, &path, added);
                merged.insert(key.clone(), d.clone());
            }
        }
    }
    merged
}

fn collect_leaves(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::Table(t) if !t.is_empty() => {
            for (k, v) in t {
                collect_leaves(v, &join_path(path, k), out);
            }
        }
        _ => out.push(path.to_string()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn is_compatible_scalar(default: &Value, user: &Value) -> bool {
    matches!(
        (default, user),
        (Value::String(_), Value::String(_))
            | (Value::Integer(_), Value::Integer(_))
            | (Value::Float(_), Value::Float(_))
            | (Value::Boolean(_), Value::Boolean(_))
            | (Value::Datetime(_), Value::Datetime(_))
    )
}
