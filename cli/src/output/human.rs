//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::doctor::Diagnosis;
use crate::application::services::migration::{InitReport, MigrationReport};
use crate::application::services::reconcile::ReconcileOutcome;
use crate::application::services::self_update::{AliasOutcome, SelfUpdateOutcome};
use crate::domain::ConstructConfig;
use crate::output::OutputContext;

/// Renders service results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version. Printed even when quiet: it is the command's output.
    pub fn render_version(&self, version: &str) {
        println!("construct {version}");
    }

    pub fn render_init(&self, report: &InitReport) {
        self.ctx.info(&format!(
            "Materialized {} templates for construct {}",
            report.files, report.version
        ));
    }

    pub fn render_migration(&self, report: &MigrationReport) {
        if let Some(backup) = &report.config_backup {
            self.ctx
                .kv("Previous config:", &backup.display().to_string());
        }
        for key in &report.packages_added {
            self.ctx.info(&format!(
                "packages.toml: added {}",
                key.style(self.ctx.styles.highlight)
            ));
        }
        if !report.images.removed_by.is_empty() {
            self.ctx.kv(
                "Removed image from:",
                &report.images.removed_by.join(", "),
            );
        }
    }

    pub fn render_diagnosis(&self, diagnosis: &Diagnosis) {
        self.ctx.header("Construct Health Check");
        println!();
        self.ctx.kv("Binary version:  ", &diagnosis.current);
        self.ctx.kv(
            "Config version:  ",
            diagnosis.installed.as_deref().unwrap_or("(not recorded)"),
        );
        println!();

        if diagnosis.config_present {
            self.ctx.success("config.toml present");
        } else {
            self.ctx.warn("config.toml missing");
        }

        if diagnosis.missing_keys.is_empty() {
            self.ctx.success("All default settings present");
        } else {
            self.ctx.warn(&format!(
                "{} default settings missing:",
                diagnosis.missing_keys.len()
            ));
            for key in &diagnosis.missing_keys {
                if !self.ctx.quiet {
                    println!("      {}", key.style(self.ctx.styles.dim));
                }
            }
            self.ctx.info("Run: construct sys doctor --fix");
        }

        for invalid in &diagnosis.invalid_values {
            self.ctx.warn(&invalid.to_string().replace("\n\n", " · "));
        }

        if diagnosis.marker.present {
            self.ctx.warn(&format!(
                "Container rebuild pending: {}",
                diagnosis.marker.reason
            ));
            self.ctx.info("Run: construct sys rebuild");
        } else {
            self.ctx.success("Container image up to date");
        }
    }

    pub fn render_repair(&self, outcome: &ReconcileOutcome) {
        if !outcome.written {
            return;
        }
        for key in &outcome.added {
            self.ctx.info(&format!(
                "added {}",
                key.style(self.ctx.styles.highlight)
            ));
        }
        if let Some(backup) = &outcome.backup {
            self.ctx.kv("Backup:", &backup.display().to_string());
        }
    }

    pub fn render_self_update(&self, outcome: &SelfUpdateOutcome) {
        match outcome {
            SelfUpdateOutcome::AlreadyLatest { installed, remote } => {
                self.ctx.success(&format!(
                    "Already on the latest version ({installed}; remote {remote})"
                ));
            }
            SelfUpdateOutcome::Installed(report) => {
                self.ctx.success(&format!(
                    "Updated construct {} → {}",
                    report.from,
                    report.to.style(self.ctx.styles.highlight)
                ));
                if report.user_local {
                    self.ctx
                        .kv("Installed to:", &report.target.display().to_string());
                }
                if let Some(file) = &report.path_updated {
                    self.ctx.info(&format!(
                        "Added ~/.local/bin to PATH in {}; open a new shell to pick it up",
                        file.display()
                    ));
                }
                match &report.alias {
                    Some(AliasOutcome::Created) => self.ctx.info("Created the ct alias"),
                    Some(AliasOutcome::Replaced { .. }) => {
                        self.ctx.info("Pointed the ct alias at the new binary");
                    }
                    _ => {}
                }
            }
        }
    }

    pub fn render_config(&self, config: &ConstructConfig, path: &Path) {
        if self.ctx.quiet {
            return;
        }
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let rows = [
            ("runtime.engine:", config.runtime.engine.clone()),
            ("runtime.update_channel:", config.runtime.channel().as_str().to_string()),
            (
                "runtime.auto_update_check:",
                config.runtime.auto_update_check.to_string(),
            ),
            (
                "runtime.update_check_interval:",
                format!("{}s", config.runtime.update_interval().as_secs()),
            ),
            ("network.mode:", config.network.mode.clone()),
            ("sandbox.shell:", config.sandbox.shell.clone()),
            ("daemon.auto_start:", config.daemon.auto_start.to_string()),
        ];
        for (key, value) in rows {
            println!("  {key:<32} {value}");
        }
        if !config.claude.cc.is_empty() {
            let providers: Vec<&str> = config.claude.cc.keys().map(String::as_str).collect();
            println!("  {:<32} {}", "claude.cc providers:", providers.join(", "));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["CONSTRUCT_CONFIG_DIR", "CONSTRUCT_LOG", "NO_COLOR"] {
            println!(
                "    {:<22} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
    }

    pub fn render_rebuild(&self, engine: &str) {
        self.ctx
            .success(&format!("Rebuilt construct-box:latest with {engine}"));
    }

    pub fn render_update_notice(&self, remote: &str) {
        if self.ctx.quiet {
            return;
        }
        eprintln!(
            "  {} construct {} is available. Run: construct sys self-update",
            "↑".style(self.ctx.styles.info),
            remote.style(self.ctx.styles.highlight)
        );
    }
}
