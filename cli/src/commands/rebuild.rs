//! `construct sys rebuild`

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::ContainerRuntime;
use crate::application::services::rebuild_marker;
use crate::domain::layout::IMAGE_NAME;
use crate::infra::command_runner::BUILD_TIMEOUT;

/// Build the sandbox image from `container/`, then clear the marker.
///
/// # Errors
///
/// Returns an error if no runtime can build the image; the marker stays.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = app.load_config()?;
    let marker = rebuild_marker::get(&app.fs, &app.layout)?;
    if marker.present {
        app.output.info(&format!("Rebuild requested: {}", marker.reason));
    }
    app.output.info(&format!("Building {IMAGE_NAME}..."));

    let engine = app
        .runtime(&config, BUILD_TIMEOUT)
        .build_image(IMAGE_NAME, &app.layout.container_dir())
        .await
        .with_context(|| format!("rebuilding {IMAGE_NAME}"))?;
    rebuild_marker::clear(&app.fs, &app.layout)?;
    tracing::info!(%engine, "image rebuilt, marker cleared");
    app.renderer().rebuild(&engine)
}
