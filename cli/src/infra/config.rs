//! Infrastructure implementation of the `ConfigStore` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::{ConfigLayout, ConstructConfig, EngineError, config, reconcile};

/// Reads `config.toml` from a config tree.
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    #[must_use]
    pub fn new(layout: &ConfigLayout) -> Self {
        Self {
            path: layout.config_toml(),
        }
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<ConstructConfig> {
        if !self.path.exists() {
            return Ok(ConstructConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        let doc = reconcile::parse_document(&self.path, &content)?;
        config::from_document(&doc).map_err(|e| {
            EngineError::Schema {
                path: self.path.clone(),
                message: e.message().to_string(),
            }
            .into()
        })
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}
