//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Engine errors ─────────────────────────────────────────────────────────────

/// Error kinds surfaced by the upgrade and reconciliation engine.
///
/// A missing sidecar is never an error: readers return `None` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot parse {path}: {message}\n\nFix the TOML syntax or restore it from {path}.backup")]
    Parse { path: PathBuf, message: String },

    /// The file is valid TOML but a value has the wrong type for its key.
    #[error(
        "{path} has a setting of the wrong type: {message}\n\nRun `construct sys doctor` to list the offending keys, or restore it from {path}.backup"
    )]
    Schema { path: PathBuf, message: String },

    #[error(
        "permission denied while trying to {op} {path}\n\nCheck ownership of {path} or re-run from a user that can write to it."
    )]
    Permission {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("network error fetching {url}: {message}\n\nCheck your connection and try again.")]
    Network { url: String, message: String },

    #[error(
        "release archive has no '{expected}' entry\n\nThe download may be corrupted; nothing was installed."
    )]
    Integrity { expected: String },

    #[error("'{}' points at {}, leaving it untouched", link.display(), target.display())]
    Conflict { link: PathBuf, target: PathBuf },
}

impl EngineError {
    /// Stable machine-readable code for `--json` error objects.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse_error",
            Self::Schema { .. } => "schema_error",
            Self::Permission { .. } => "permission_denied",
            Self::Network { .. } => "network_error",
            Self::Integrity { .. } => "integrity_error",
            Self::Conflict { .. } => "conflict",
        }
    }

    /// The first engine error in `err`'s chain.
    #[must_use]
    pub fn find(err: &anyhow::Error) -> Option<&EngineError> {
        err.chain().find_map(|cause| cause.downcast_ref::<EngineError>())
    }

    /// Returns `true` when any error in the chain is a permission failure,
    /// either the typed [`EngineError::Permission`] or a raw
    /// `std::io::ErrorKind::PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<EngineError>(),
                Some(EngineError::Permission { .. })
            ) || cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::PermissionDenied)
        })
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration value validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
