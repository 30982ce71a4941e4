//! Typed view of `packages.toml` and the install script derived from it.
//!
//! The script is consumed by the container entrypoint. It must be safe to run
//! repeatedly, and every user-supplied value is single-quoted.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Set when this release changes the `packages.toml` schema incompatibly and
/// user files must be rebuilt from the template (Mode A) instead of topped up.
pub const PACKAGES_SCHEMA_BREAKING: bool = false;

/// Top-level package declarations.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PackagesConfig {
    pub apt: PackageList,
    pub brew: BrewConfig,
    pub npm: PackageList,
    pub pip: PackageList,
    /// Tool toggles, e.g. `uv = true`.
    pub tools: BTreeMap<String, bool>,
    pub post_install: PostInstall,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PackageList {
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BrewConfig {
    pub taps: Vec<String>,
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PostInstall {
    pub commands: Vec<String>,
}

/// Quote a value for POSIX shells: `'` becomes `'\''`.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn quoted_words(values: &[String]) -> String {
    values
        .iter()
        .map(|v| shell_quote(v))
        .collect::<Vec<_>>()
        .join(" ")
}

const SCRIPT_PRELUDE: &str = r#"#!/usr/bin/env bash
# Generated by construct from packages.toml. Do not edit: changes are
# overwritten on the next migration. Edit packages.toml instead.
set -euo pipefail

have() { command -v "$1" >/dev/null 2>&1; }

construct_install_tool() {
    case "$1" in
        uv) have uv || curl -LsSf https://astral.sh/uv/install.sh | sh ;;
        bun) have bun || curl -fsSL https://bun.sh/install | bash ;;
        deno) have deno || curl -fsSL https://deno.land/install.sh | sh -s -- -y ;;
        rust) have rustup || curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y ;;
        *) echo "construct: unknown tool '$1', skipping" >&2 ;;
    esac
}
"#;

impl PackagesConfig {
    /// Render the install script for these declarations.
    #[must_use]
    pub fn render_install_script(&self) -> String {
        let mut script = String::from(SCRIPT_PRELUDE);

        if !self.apt.packages.is_empty() {
            let _ = write!(
                script,
                "\nif have apt-get; then\n    sudo apt-get update -qq\n    sudo apt-get install -y -qq {}\nfi\n",
                quoted_words(&self.apt.packages)
            );
        }

        if !self.brew.taps.is_empty() || !self.brew.packages.is_empty() {
            script.push_str("\nif have brew; then\n");
            for tap in &self.brew.taps {
                let _ = writeln!(script, "    brew tap {}", shell_quote(tap));
            }
            if !self.brew.packages.is_empty() {
                let _ = writeln!(
                    script,
                    "    brew install {}",
                    quoted_words(&self.brew.packages)
                );
            }
            script.push_str("fi\n");
        }

        if !self.npm.packages.is_empty() {
            let _ = write!(
                script,
                "\nif have npm; then\n    npm install -g {}\nfi\n",
                quoted_words(&self.npm.packages)
            );
        }

        if !self.pip.packages.is_empty() {
            let _ = write!(
                script,
                "\nif have pip3; then\n    pip3 install --user --upgrade {}\nfi\n",
                quoted_words(&self.pip.packages)
            );
        }

        let enabled: Vec<&String> = self
            .tools
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name)
            .collect();
        if !enabled.is_empty() {
            script.push('\n');
            for name in enabled {
                let _ = writeln!(script, "construct_install_tool {}", shell_quote(name));
            }
        }

        if !self.post_install.commands.is_empty() {
            script.push('\n');
            for command in &self.post_install.commands {
                let _ = writeln!(script, "bash -c {}", shell_quote(command));
            }
        }

        script
    }
}
