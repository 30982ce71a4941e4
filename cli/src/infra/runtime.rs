//! Container runtime CLIs (`docker`, `podman`, Apple `container`) behind the
//! `ContainerRuntime` port.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ContainerRuntime, ImageRemoval};

/// Stderr fragments that mean "nothing to remove".
const NOT_FOUND_MARKERS: &[&str] = &["No such image", "not found", "image not known"];

/// Drives the runtime CLIs in a fixed preference order.
pub struct RuntimeCli<R> {
    runner: R,
    engines: Vec<String>,
}

impl<R: CommandRunner> RuntimeCli<R> {
    /// `engines` is tried in order; see `RuntimeConfig::engine_order`.
    #[must_use]
    pub fn new(runner: R, engines: Vec<String>) -> Self {
        Self { runner, engines }
    }
}

fn remove_args(engine: &str, image: &str) -> Vec<String> {
    match engine {
        "container" => vec!["image".into(), "delete".into(), image.into()],
        _ => vec!["rmi".into(), image.into()],
    }
}

fn is_not_found(stderr: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m))
}

impl<R: CommandRunner> ContainerRuntime for RuntimeCli<R> {
    async fn remove_image(&self, image: &str) -> Result<ImageRemoval> {
        let mut removal = ImageRemoval::default();
        let mut first_error = None;
        for engine in &self.engines {
            let args = remove_args(engine, image);
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let output = match self.runner.run(engine, &args).await {
                Ok(output) => output,
                Err(e) => {
                    tracing::debug!(%engine, error = %e, "runtime unavailable");
                    continue;
                }
            };
            let stderr = String::from_utf8_lossy(&output.stderr);
            if output.status.success() {
                tracing::info!(%engine, %image, "removed image");
                removal.removed_by.push(engine.clone());
            } else if is_not_found(&stderr) {
                removal.not_found_in.push(engine.clone());
            } else {
                tracing::warn!(%engine, %image, stderr = %stderr.trim(), "image removal failed");
                first_error.get_or_insert_with(|| {
                    anyhow::anyhow!("{engine} could not remove {image}: {}", stderr.trim())
                });
            }
        }
        match first_error {
            Some(err) if removal.removed_by.is_empty() => Err(err),
            _ => Ok(removal),
        }
    }

    async fn build_image(&self, image: &str, context_dir: &Path) -> Result<String> {
        let context = context_dir.to_string_lossy();
        for engine in &self.engines {
            let status = match self
                .runner
                .run_status(engine, &["build", "-t", image, &context])
                .await
            {
                Ok(status) => status,
                Err(e) => {
                    tracing::debug!(%engine, error = %e, "runtime unavailable");
                    continue;
                }
            };
            if !status.success() {
                anyhow::bail!("{engine} build of {image} failed ({status})");
            }
            return Ok(engine.clone());
        }
        Err(anyhow::anyhow!(
            "no container runtime found (tried {})",
            self.engines.join(", ")
        ))
        .context("building image")
    }
}
