//! Typed view of `config.toml`.
//!
//! Pure types and validators only: no I/O, no async, no filesystem access.
//! The reconciler works on the raw document; this view is what the rest of
//! the CLI reads settings from.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::domain::error::ConfigError;
use crate::domain::reconcile;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_ENGINES: &[&str] = &["docker", "podman", "container"];
pub const VALID_NETWORK_MODES: &[&str] = &["permissive", "strict", "offline"];
pub const VALID_CHANNELS: &[&str] = &["stable", "beta"];

/// Interval used when `update_check_interval` is `0`.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConstructConfig {
    pub runtime: RuntimeConfig,
    pub sandbox: SandboxConfig,
    pub network: NetworkConfig,
    pub maintenance: MaintenanceConfig,
    pub agents: AgentsConfig,
    pub daemon: DaemonConfig,
    pub claude: ClaudeConfig,
}

/// `[runtime]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Container engine: `docker`, `podman` or `container`.
    pub engine: String,
    pub auto_update_check: bool,
    /// Seconds between remote version checks. `0` means the 24h default.
    pub update_check_interval: u64,
    pub update_channel: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: "docker".to_string(),
            auto_update_check: true,
            update_check_interval: DEFAULT_UPDATE_INTERVAL.as_secs(),
            update_channel: "stable".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Effective interval between update checks.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        if self.update_check_interval == 0 {
            DEFAULT_UPDATE_INTERVAL
        } else {
            Duration::from_secs(self.update_check_interval)
        }
    }

    #[must_use]
    pub fn channel(&self) -> UpdateChannel {
        UpdateChannel::from_name(&self.update_channel)
    }

    /// Engines in the order image operations should try them: the configured
    /// one first, then the remaining known engines.
    #[must_use]
    pub fn engine_order(&self) -> Vec<String> {
        let mut order = vec![self.engine.clone()];
        order.extend(
            VALID_ENGINES
                .iter()
                .filter(|e| **e != self.engine)
                .map(|e| (*e).to_string()),
        );
        order
    }
}

/// `[sandbox]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)] // mirrors the on-disk schema one-to-one
pub struct SandboxConfig {
    pub mount_home: bool,
    pub forward_ssh_agent: bool,
    pub propagate_git_identity: bool,
    pub non_root_strict: bool,
    pub allow_custom_compose_override: bool,
    pub exec_as_host_user: bool,
    pub shell: String,
    pub clipboard_host: String,
    pub selinux_labels: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            mount_home: false,
            forward_ssh_agent: true,
            propagate_git_identity: true,
            non_root_strict: false,
            allow_custom_compose_override: false,
            exec_as_host_user: false,
            shell: "/bin/bash".to_string(),
            clipboard_host: "host.docker.internal".to_string(),
            selinux_labels: "auto".to_string(),
        }
    }
}

/// `[network]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub mode: String,
    pub allowed_domains: Vec<String>,
    pub allowed_ips: Vec<String>,
    pub blocked_domains: Vec<String>,
    pub blocked_ips: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mode: "permissive".to_string(),
            allowed_domains: Vec::new(),
            allowed_ips: Vec::new(),
            blocked_domains: Vec::new(),
            blocked_ips: Vec::new(),
        }
    }
}

/// `[maintenance]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub cleanup_enabled: bool,
    pub cleanup_interval_seconds: u64,
    pub log_retention_days: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            cleanup_enabled: true,
            cleanup_interval_seconds: 86_400,
            log_retention_days: 15,
        }
    }
}

/// `[agents]`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AgentsConfig {
    pub yolo_all: bool,
    pub yolo_agents: Vec<String>,
    pub clipboard_image_patch: bool,
}

/// `[daemon]`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    pub auto_start: bool,
    pub multi_paths_enabled: bool,
    pub mount_paths: Vec<String>,
}

/// `[claude]`: `[claude.cc.<provider>]` holds free-form environment maps.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ClaudeConfig {
    pub cc: BTreeMap<String, BTreeMap<String, String>>,
}

// ── Update channel ───────────────────────────────────────────────────────────

/// Release channel the self-updater follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateChannel {
    #[default]
    Stable,
    Beta,
}

impl UpdateChannel {
    /// Unknown names collapse to [`UpdateChannel::Stable`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "beta" => Self::Beta,
            _ => Self::Stable,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Check enumerated settings, returning one error per invalid value.
#[must_use]
pub fn validate(config: &ConstructConfig) -> Vec<ConfigError> {
    let checks: [(&str, &str, &[&str]); 3] = [
        ("runtime.engine", &config.runtime.engine, VALID_ENGINES),
        ("runtime.update_channel", &config.runtime.update_channel, VALID_CHANNELS),
        ("network.mode", &config.network.mode, VALID_NETWORK_MODES),
    ];
    checks
        .into_iter()
        .filter(|(_, value, valid)| !valid.contains(value))
        .map(|(key, value, valid)| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: valid.join(", "),
        })
        .collect()
}

/// Build the typed view from an already-parsed document.
///
/// # Errors
///
/// Returns the deserializer's error when a value has the wrong type.
pub fn from_document(doc: &Table) -> Result<ConstructConfig, toml::de::Error> {
    Value::Table(doc.clone()).try_into()
}

/// Every problem in a parsed `config.toml`, without failing on any of them.
///
/// Kind mismatches against `defaults` come first. Only when there are none is
/// the typed view built and passed through [`validate`].
#[must_use]
pub fn check_document(defaults: &Table, doc: &Table) -> Vec<ConfigError> {
    let mismatches = reconcile::type_mismatches(defaults, doc);
    if !mismatches.is_empty() {
        return mismatches;
    }
    match from_document(doc) {
        Ok(typed) => validate(&typed),
        Err(e) => vec![ConfigError::InvalidValue {
            key: "config.toml".to_string(),
            value: e.message().to_string(),
            valid: "the types used in the default config.toml".to_string(),
        }],
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
