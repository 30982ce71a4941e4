//! Application context: unified state passed to every command handler.
//!
//! `AppContext` carries the output mode, the resolved config tree and the
//! production adapters. Adding a new cross-cutting concern requires only one
//! field change here; command signatures stay the same.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::{ConfigLayout, ConstructConfig};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::TomlConfigStore;
use crate::infra::fs::StdFs;
use crate::infra::release::HttpReleaseSource;
use crate::infra::runtime::RuntimeCli;
use crate::infra::templates::EmbeddedTemplates;
use crate::output::{AnyReporter, HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Environment variable that relocates the whole config tree.
pub const CONFIG_DIR_ENV: &str = "CONSTRUCT_CONFIG_DIR";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `CONSTRUCT_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode). Quiet in JSON mode so
    /// progress lines never mix with the JSON document.
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// The config tree this invocation operates on.
    pub layout: ConfigLayout,
    /// The user's home directory (shell rc files, `~/.local/bin`).
    pub home: PathBuf,
    pub fs: StdFs,
    pub templates: EmbeddedTemplates,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` or `--json` is passed, or when the `CI` or
    /// `CONSTRUCT_YES` environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// embedded templates are incomplete.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("CONSTRUCT_YES").is_ok();
        let non_interactive = flags.behaviour.yes || flags.output.json || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        let home = dirs::home_dir().context("cannot determine home directory")?;
        let layout = match std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => ConfigLayout::new(dir),
            None => ConfigLayout::from_home(&home),
        };
        tracing::debug!(root = %layout.root().display(), "config tree");

        Ok(Self {
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            layout,
            home,
            fs: StdFs,
            templates: EmbeddedTemplates::load()?,
            non_interactive,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Spinner on a TTY, plain lines otherwise; silent when quiet.
    #[must_use]
    pub fn reporter(&self, initial: &str) -> AnyReporter<'_> {
        AnyReporter::for_context(&self.output, initial)
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `CONSTRUCT_YES`
    /// env), returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    #[must_use]
    pub fn config_store(&self) -> TomlConfigStore {
        TomlConfigStore::new(&self.layout)
    }

    /// Typed view of `config.toml`, defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.toml` exists but is not valid TOML.
    pub fn load_config(&self) -> Result<ConstructConfig> {
        self.config_store().load()
    }

    /// Container runtimes in the order `config` prefers them.
    #[must_use]
    pub fn runtime(&self, config: &ConstructConfig, timeout: Duration) -> RuntimeCli<TokioCommandRunner> {
        RuntimeCli::new(
            TokioCommandRunner::new(timeout),
            config.runtime.engine_order(),
        )
    }

    /// Release endpoints, honoring `CONSTRUCT_RELEASES_URL` / `CONSTRUCT_VERSION_URL`.
    #[must_use]
    pub fn releases(&self) -> HttpReleaseSource {
        HttpReleaseSource::from_env()
    }
}
