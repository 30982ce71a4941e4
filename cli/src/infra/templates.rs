//! Embedded templates: every file under `cli/templates/` compiled into the binary.
//!
//! At compile time, `include_dir!` embeds:
//!   - `config.toml`, `packages.toml`  user-owned, reconciled on upgrade
//!   - `container/*`                   engine-owned, overwritten on upgrade

use anyhow::Result;
use include_dir::{Dir, include_dir};

use crate::application::ports::TemplateSource;
use crate::domain::Template;
use crate::domain::template::{MODE_DATA, MODE_EXEC, names};

static EMBEDDED_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// `(logical name, destination relative to the tree root, mode)`.
const CATALOG: &[(&str, &str, u32)] = &[
    (names::CONFIG, "config.toml", MODE_DATA),
    (names::PACKAGES, "packages.toml", MODE_DATA),
    (names::DOCKERFILE, "container/Dockerfile", MODE_DATA),
    (names::COMPOSE, "container/docker-compose.yml", MODE_DATA),
    (names::ENTRYPOINT, "container/entrypoint.sh", MODE_EXEC),
    (names::UPDATE_ALL, "container/update-all.sh", MODE_EXEC),
    (names::NETWORK_FILTER, "container/network-filter.sh", MODE_EXEC),
    (names::CLIPPER, "container/clipper", MODE_EXEC),
    (names::CLIPBOARD_X11_SYNC, "container/clipboard-x11-sync.sh", MODE_EXEC),
    (names::OSASCRIPT, "container/osascript", MODE_EXEC),
    (names::POWERSHELL, "container/powershell.exe", MODE_EXEC),
];

/// The compiled-in template set.
#[derive(Debug, Clone)]
pub struct EmbeddedTemplates {
    templates: Vec<Template>,
}

impl EmbeddedTemplates {
    /// Resolve every catalog entry against the embedded directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog entry has no embedded file.
    pub fn load() -> Result<Self> {
        let templates = CATALOG
            .iter()
            .map(|&(name, dest, mode)| {
                let file = EMBEDDED_TEMPLATES
                    .get_file(dest)
                    .ok_or_else(|| anyhow::anyhow!("embedded template not found: {dest}"))?;
                Ok(Template {
                    name,
                    bytes: file.contents(),
                    mode,
                    dest,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { templates })
    }
}

impl TemplateSource for EmbeddedTemplates {
    fn templates(&self) -> &[Template] {
        &self.templates
    }
}
