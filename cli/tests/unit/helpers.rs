//! Shared test doubles for the library-level tests.

use std::path::Path;

use anyhow::Result;
use construct_cli::application::ports::{ContainerRuntime, ImageRemoval, ProgressReporter};
use construct_cli::domain::ConfigLayout;

/// A host with no container runtime installed.
pub struct NoRuntime;

impl ContainerRuntime for NoRuntime {
    async fn remove_image(&self, _image: &str) -> Result<ImageRemoval> {
        Ok(ImageRemoval::default())
    }

    async fn build_image(&self, image: &str, _context_dir: &Path) -> Result<String> {
        anyhow::bail!("no container runtime available to build {image}")
    }
}

/// Discards progress output.
pub struct Silent;

impl ProgressReporter for Silent {
    fn step(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// A scratch config tree rooted in a fresh temp directory.
pub fn scratch() -> (tempfile::TempDir, ConfigLayout) {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = ConfigLayout::new(dir.path().join("construct-cli"));
    std::fs::create_dir_all(layout.root()).expect("mkdir");
    (dir, layout)
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}
