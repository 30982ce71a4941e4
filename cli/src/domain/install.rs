//! Rules for where a self-updated binary goes and how it is found on `PATH`.
//!
//! Package-manager detection is by substring on the resolved executable path.
//! New package managers only need a new entry in [`PACKAGE_MANAGER_PREFIXES`].

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Resolved-path fragments that mark a package-manager-owned install.
pub const PACKAGE_MANAGER_PREFIXES: &[&str] = &[
    "/opt/homebrew/Cellar/construct-cli/",
    "/usr/local/Cellar/construct-cli/",
    "/home/linuxbrew/.linuxbrew/Cellar/construct-cli/",
];

/// Line written above the `PATH` export; its presence makes the edit idempotent.
pub const PATH_MARKER: &str = "# Prefer Construct user-local binary";

/// Binary name.
pub const BINARY_NAME: &str = "construct";

/// Short alias installed next to a user-local binary.
pub const ALIAS_NAME: &str = "ct";

/// Returns `true` if `path` lies inside a package-manager-owned prefix.
#[must_use]
pub fn is_package_manager_path(path: &Path) -> bool {
    let text = path.to_string_lossy();
    PACKAGE_MANAGER_PREFIXES.iter().any(|p| text.contains(p))
}

/// `$HOME/.local/bin`
#[must_use]
pub fn user_local_bin(home: &Path) -> PathBuf {
    home.join(".local").join("bin")
}

/// `$HOME/.local/bin/construct`
#[must_use]
pub fn user_local_target(home: &Path) -> PathBuf {
    user_local_bin(home).join(BINARY_NAME)
}

// ── Platform ─────────────────────────────────────────────────────────────────

/// Release platform naming (`linux`/`darwin`, `amd64`/`arm64`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    /// Map Rust target names onto release names.
    ///
    /// # Errors
    ///
    /// Returns an error for platforms no release is published for.
    pub fn from_target(os: &str, arch: &str) -> Result<Self> {
        let os = match os {
            "linux" => "linux",
            "macos" => "darwin",
            _ => anyhow::bail!("unsupported platform: {os}-{arch}"),
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            _ => anyhow::bail!("unsupported platform: {os}-{arch}"),
        };
        Ok(Self { os, arch })
    }

    /// The platform this binary was compiled for.
    ///
    /// # Errors
    ///
    /// Returns an error for platforms no release is published for.
    pub fn current() -> Result<Self> {
        Self::from_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// `construct-<os>-<arch>`, the binary's name inside a release archive.
    #[must_use]
    pub fn binary_entry(&self) -> String {
        format!("{BINARY_NAME}-{}-{}", self.os, self.arch)
    }

    /// `construct-<os>-<arch>-<version>.tar.gz`
    #[must_use]
    pub fn asset_name(&self, version: &str) -> String {
        format!("{}-{version}.tar.gz", self.binary_entry())
    }
}

/// `<releases-base>/<version>/construct-<os>-<arch>-<version>.tar.gz`
#[must_use]
pub fn asset_url(releases_base: &str, version: &str, platform: &Platform) -> String {
    format!(
        "{}/{version}/{}",
        releases_base.trim_end_matches('/'),
        platform.asset_name(version)
    )
}

// ── Shell PATH augmentation ──────────────────────────────────────────────────

/// Shells whose startup file the updater knows how to extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Zsh,
    Bash,
    Fish,
}

impl ShellKind {
    /// Classify the `SHELL` environment value by its basename.
    #[must_use]
    pub fn from_env(shell: &str) -> Option<Self> {
        let name = Path::new(shell.trim())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        match name {
            "zsh" => Some(Self::Zsh),
            "bash" => Some(Self::Bash),
            "fish" => Some(Self::Fish),
            _ => None,
        }
    }

    /// Startup file to append to. Bash prefers `~/.bashrc` and falls back to
    /// `~/.bash_profile` when `.bashrc` does not exist.
    #[must_use]
    pub fn config_file(self, home: &Path, bashrc_exists: bool) -> PathBuf {
        match self {
            Self::Zsh => home.join(".zshrc"),
            Self::Bash if bashrc_exists => home.join(".bashrc"),
            Self::Bash => home.join(".bash_profile"),
            Self::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }

    /// Block appended to the startup file, marker first.
    #[must_use]
    pub fn path_snippet(self) -> String {
        let line = match self {
            Self::Zsh | Self::Bash => r#"export PATH="$HOME/.local/bin:$PATH""#,
            Self::Fish => "fish_add_path --move --prepend $HOME/.local/bin",
        };
        format!("\n{PATH_MARKER}\n{line}\n")
    }
}
