//! Migration driver: brings an on-disk installation up to the running binary.
//!
//! Steps run strictly in order and each one is safe to repeat:
//! 1. overwrite the engine-owned container templates;
//! 2. reconcile `config.toml` (prefer user values);
//! 3. reconcile `packages.toml` (additive, or prefer-user on schema breaks);
//! 4. regenerate the install script when its inputs changed;
//! 5. drop the cached image and write the rebuild marker;
//! 6. write `.version`.
//!
//! `.version` is the commit point. Any failure before step 6 leaves it
//! unchanged so the next invocation retries from step 1.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{ContainerRuntime, ImageRemoval, LocalFs, ProgressReporter, TemplateSource};
use crate::application::services::{rebuild_marker, reconcile, sidecar};
use crate::domain::layout::IMAGE_NAME;
use crate::domain::packages::{PACKAGES_SCHEMA_BREAKING, PackagesConfig};
use crate::domain::reconcile::parse_document;
use crate::domain::template::{MODE_EXEC, names};
use crate::domain::{ConfigLayout, EngineError};

/// How `packages.toml` is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagesPolicy {
    /// Graft in newly declared defaults, keep user entries untouched.
    Additive,
    /// Rebuild from the template schema, keeping compatible user values.
    Replace,
}

impl PackagesPolicy {
    /// Policy compiled into this release.
    #[must_use]
    pub fn for_release() -> Self {
        if PACKAGES_SCHEMA_BREAKING {
            Self::Replace
        } else {
            Self::Additive
        }
    }
}

/// Summary of a completed migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: String,
    pub to: String,
    pub container_files: usize,
    pub config_backup: Option<PathBuf>,
    pub packages_added: Vec<String>,
    pub script_regenerated: bool,
    pub images: ImageRemoval,
}

/// Summary of a fresh-install initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub version: String,
    pub files: usize,
}

/// Drives initialization and migration of one config tree.
pub struct Migrator<'a, F, T, R, P> {
    fs: &'a F,
    templates: &'a T,
    runtime: &'a R,
    reporter: &'a P,
    layout: &'a ConfigLayout,
    current: &'a str,
}

impl<'a, F, T, R, P> Migrator<'a, F, T, R, P>
where
    F: LocalFs,
    T: TemplateSource,
    R: ContainerRuntime,
    P: ProgressReporter,
{
    #[must_use]
    pub fn new(
        fs: &'a F,
        templates: &'a T,
        runtime: &'a R,
        reporter: &'a P,
        layout: &'a ConfigLayout,
        current: &'a str,
    ) -> Self {
        Self {
            fs,
            templates,
            runtime,
            reporter,
            layout,
            current,
        }
    }

    /// First run: materialize every template, write sidecars and `.version`.
    ///
    /// No backups are taken and no rebuild is requested.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn initialize(&self) -> Result<InitReport> {
        self.reporter.step("Initializing construct config...");
        for dir in [
            self.layout.root().to_path_buf(),
            self.layout.container_dir(),
            self.layout.home_dir(),
            self.layout.logs_dir(),
        ] {
            self.fs.create_dir_all(&dir)?;
        }

        let mut files = 0;
        for template in self.templates.templates() {
            let dest = self.layout.resolve(template.dest);
            self.fs
                .write_atomic(&dest, template.bytes, template.mode)
                .with_context(|| format!("materializing {}", template.name))?;
            files += 1;
        }

        self.regenerate_install_script()?;
        self.write_hash_sidecars()?;
        sidecar::set_installed_version(self.fs, self.layout, self.current)?;

        tracing::info!(version = %self.current, files, "initialized config tree");
        self.reporter
            .success(&format!("Initialized {}", self.layout.root().display()));
        Ok(InitReport {
            version: self.current.to_string(),
            files,
        })
    }

    /// Run the six migration steps, committing with `.version` last.
    ///
    /// # Errors
    ///
    /// Returns the first step failure; `.version` is then left unchanged.
    pub async fn migrate(&self, from: &str, policy: PackagesPolicy) -> Result<MigrationReport> {
        tracing::info!(%from, to = %self.current, ?policy, "migration started");
        self.reporter
            .step(&format!("Migrating construct config {from} → {}...", self.current));

        let (container_files, entrypoint_changed) = self
            .materialize_container_templates()
            .context("migration step 1 (container templates)")?;

        let config_backup = self
            .reconcile_config()
            .context("migration step 2 (config.toml)")?;

        let (packages_added, packages_changed) = self
            .reconcile_packages(policy)
            .context("migration step 3 (packages.toml)")?;

        let script_regenerated = self
            .refresh_derived_scripts(entrypoint_changed || packages_changed)
            .context("migration step 4 (install script)")?;

        let images = self
            .mark_for_rebuild(from)
            .await
            .context("migration step 5 (rebuild marker)")?;

        sidecar::set_installed_version(self.fs, self.layout, self.current)
            .context("migration step 6 (.version)")?;

        tracing::info!(%from, to = %self.current, "migration complete");
        self.reporter
            .success(&format!("Migrated to construct {}", self.current));
        Ok(MigrationReport {
            from: from.to_string(),
            to: self.current.to_string(),
            container_files,
            config_backup,
            packages_added,
            script_regenerated,
            images,
        })
    }

    fn materialize_container_templates(&self) -> Result<(usize, bool)> {
        self.fs.create_dir_all(&self.layout.container_dir())?;
        let mut count = 0;
        for template in self.templates.templates().iter().filter(|t| t.is_container_file()) {
            let dest = self.layout.resolve(template.dest);
            self.fs
                .write_atomic(&dest, template.bytes, template.mode)
                .with_context(|| format!("materializing {}", dest.display()))?;
            count += 1;
        }
        let entrypoint = self.templates.get(names::ENTRYPOINT)?;
        let changed = sidecar::read(self.fs, &self.layout.entrypoint_hash())?.as_deref()
            != Some(entrypoint.sha256().as_str());
        self.reporter
            .success(&format!("Refreshed {count} container files"));
        Ok((count, changed))
    }

    fn reconcile_config(&self) -> Result<Option<PathBuf>> {
        let template = self.templates.get(names::CONFIG)?;
        let outcome = reconcile::prefer_user(self.fs, &self.layout.config_toml(), template)?;
        sidecar::refresh_hash(self.fs, &self.layout.config_hash(), &template.sha256())?;
        self.reporter.success("Reconciled config.toml");
        Ok(outcome.backup)
    }

    fn reconcile_packages(&self, policy: PackagesPolicy) -> Result<(Vec<String>, bool)> {
        let template = self.templates.get(names::PACKAGES)?;
        let path = self.layout.packages_toml();
        let outcome = match policy {
            PackagesPolicy::Additive => reconcile::add_missing(
                self.fs,
                &path,
                template,
                &format!("construct {} migration", self.current),
            )?,
            PackagesPolicy::Replace => reconcile::prefer_user(self.fs, &path, template)?,
        };
        let changed = sidecar::read(self.fs, &self.layout.packages_hash())?.as_deref()
            != Some(template.sha256().as_str());
        if outcome.written {
            self.reporter.success("Reconciled packages.toml");
        }
        Ok((outcome.added, changed))
    }

    /// Hash sidecars are only written once the script reflects them, so an
    /// interrupted run regenerates again on retry.
    fn refresh_derived_scripts(&self, inputs_changed: bool) -> Result<bool> {
        let regenerate = inputs_changed || !self.fs.exists(&self.layout.install_script());
        if regenerate {
            self.regenerate_install_script()?;
            self.reporter.success("Regenerated package install script");
        }
        self.write_hash_sidecars()?;
        Ok(regenerate)
    }

    async fn mark_for_rebuild(&self, from: &str) -> Result<ImageRemoval> {
        let images = match self.runtime.remove_image(IMAGE_NAME).await {
            Ok(images) => images,
            Err(e) => {
                tracing::warn!(error = %e, image = IMAGE_NAME, "could not remove cached image");
                self.reporter
                    .warn(&format!("Could not remove {IMAGE_NAME}: {e}"));
                ImageRemoval::default()
            }
        };
        rebuild_marker::set(
            self.fs,
            self.layout,
            &format!(
                "construct upgraded from {from} to {}; container templates changed",
                self.current
            ),
        )?;
        self.reporter.success("Container image will rebuild on next start");
        Ok(images)
    }

    /// Write `container/install_user_packages.sh` from the live `packages.toml`.
    fn regenerate_install_script(&self) -> Result<()> {
        let path = self.layout.packages_toml();
        let packages = if self.fs.exists(&path) {
            let text = self
                .fs
                .read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let doc = parse_document(&path, &text)?;
            toml::Value::Table(doc)
                .try_into::<PackagesConfig>()
                .map_err(|e| EngineError::Schema {
                    path: path.clone(),
                    message: e.message().to_string(),
                })?
        } else {
            PackagesConfig::default()
        };
        let script = self.layout.install_script();
        self.fs
            .write_atomic(&script, packages.render_install_script().as_bytes(), MODE_EXEC)
            .with_context(|| format!("writing {}", script.display()))
    }

    fn write_hash_sidecars(&self) -> Result<()> {
        for (name, sidecar_path) in [
            (names::CONFIG, self.layout.config_hash()),
            (names::PACKAGES, self.layout.packages_hash()),
            (names::ENTRYPOINT, self.layout.entrypoint_hash()),
        ] {
            let template = self.templates.get(name)?;
            sidecar::refresh_hash(self.fs, &sidecar_path, &template.sha256())?;
        }
        Ok(())
    }
}
