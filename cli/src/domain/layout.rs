//! Layout of the config tree and the sidecar files that drive the engine.
//!
//! Pure path arithmetic: nothing here touches the filesystem.

use std::path::{Path, PathBuf};

/// Config tree location relative to `$HOME`.
pub const CONFIG_DIR: &str = ".config/construct-cli";

/// Image tag the container templates build into.
pub const IMAGE_NAME: &str = "construct-box:latest";

/// Script generated from `packages.toml` and run by the container entrypoint.
pub const INSTALL_SCRIPT: &str = "install_user_packages.sh";

/// Every path the engine reads or writes, rooted at one config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    root: PathBuf,
}

impl ConfigLayout {
    /// Layout rooted at an explicit directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at `<home>/.config/construct-cli`.
    #[must_use]
    pub fn from_home(home: &Path) -> Self {
        Self::new(home.join(CONFIG_DIR))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config_toml(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    #[must_use]
    pub fn packages_toml(&self) -> PathBuf {
        self.root.join("packages.toml")
    }

    #[must_use]
    pub fn container_dir(&self) -> PathBuf {
        self.root.join("container")
    }

    /// Persistent agent home. The engine never writes below it.
    #[must_use]
    pub fn home_dir(&self) -> PathBuf {
        self.root.join("home")
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    #[must_use]
    pub fn version_file(&self) -> PathBuf {
        self.root.join(".version")
    }

    #[must_use]
    pub fn packages_hash(&self) -> PathBuf {
        self.root.join(".packages_template_hash")
    }

    #[must_use]
    pub fn entrypoint_hash(&self) -> PathBuf {
        self.root.join(".entrypoint_template_hash")
    }

    #[must_use]
    pub fn config_hash(&self) -> PathBuf {
        self.root.join(".config_template_hash")
    }

    #[must_use]
    pub fn rebuild_marker(&self) -> PathBuf {
        self.root.join(".rebuild_required")
    }

    /// Sentinel whose mtime records the last remote version check.
    #[must_use]
    pub fn update_check_sentinel(&self) -> PathBuf {
        self.root.join(".last_update_check")
    }

    #[must_use]
    pub fn install_script(&self) -> PathBuf {
        self.container_dir().join(INSTALL_SCRIPT)
    }

    /// Resolve a template destination (relative to the tree root).
    #[must_use]
    pub fn resolve(&self, dest: &str) -> PathBuf {
        self.root.join(dest)
    }
}

/// `<path>.backup`
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".backup")
}

/// `<path>.tmp`, the staging file for atomic writes.
#[must_use]
pub fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

/// Append a literal suffix to the final path component.
#[must_use]
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}
