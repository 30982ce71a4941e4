//! `construct sys config`: show the effective configuration.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;

/// Run the config command.
///
/// # Errors
///
/// Returns an error if `config.toml` cannot be parsed.
pub fn run(app: &AppContext) -> Result<()> {
    let store = app.config_store();
    let config = store.load()?;
    app.renderer().config(&config, &store.path())
}
