//! `construct sys version`

use anyhow::Result;

use crate::app::AppContext;
use crate::domain::version::CURRENT_VERSION;

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<()> {
    app.renderer().version(CURRENT_VERSION)
}
