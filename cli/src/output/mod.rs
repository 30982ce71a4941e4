//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::{AnyReporter, TerminalReporter};
pub use styles::Styles;

use crate::application::services::doctor::Diagnosis;
use crate::application::services::migration::{InitReport, MigrationReport};
use crate::application::services::reconcile::ReconcileOutcome;
use crate::application::services::self_update::SelfUpdateOutcome;
use crate::domain::ConstructConfig;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let styles = if use_colors {
            Styles::colored()
        } else {
            Styles::default()
        };

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Status lines share one shape: two spaces, a styled symbol, the message.
    /// All of them are silent when `quiet`.
    fn line(&self, symbol: &str, style: owo_colors::Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", symbol.style(style));
        }
    }

    pub fn success(&self, msg: &str) {
        self.line("✓", self.styles.success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.line("⚠", self.styles.warning, msg);
    }

    pub fn info(&self, msg: &str) {
        self.line("ℹ", self.styles.info, msg);
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Key in the dim style, value plain.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Human or JSON rendering, selected once from `--json`.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn init(&self, report: &InitReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_init(report);
                Ok(())
            }
            Self::Json(r) => r.render_init(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn migration(&self, report: &MigrationReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_migration(report);
                Ok(())
            }
            Self::Json(r) => r.render_migration(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn diagnosis(&self, diagnosis: &Diagnosis) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_diagnosis(diagnosis);
                Ok(())
            }
            Self::Json(r) => r.render_diagnosis(diagnosis),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn repair(&self, outcome: &ReconcileOutcome) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_repair(outcome);
                Ok(())
            }
            Self::Json(r) => r.render_repair(outcome),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn self_update(&self, outcome: &SelfUpdateOutcome) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_self_update(outcome);
                Ok(())
            }
            Self::Json(r) => r.render_self_update(outcome),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn config(&self, config: &ConstructConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(config, path),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn rebuild(&self, engine: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_rebuild(engine);
                Ok(())
            }
            Self::Json(r) => r.render_rebuild(engine),
        }
    }

    /// Update notices go to stderr and are skipped in JSON mode.
    pub fn update_notice(&self, remote: &str) {
        if let Self::Human(r) = self {
            r.render_update_notice(remote);
        }
    }
}
