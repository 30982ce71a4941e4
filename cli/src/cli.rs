//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Reproducible, network-restricted sandboxes for AI coding agents
#[derive(Parser)]
#[command(
    name = "construct",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log engine decisions to stderr (overridden by `CONSTRUCT_LOG`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Maintain the construct installation
    #[command(subcommand)]
    Sys(SysCommand),
}

#[derive(Subcommand)]
pub enum SysCommand {
    /// Show version
    Version,

    /// Run the config migration now, regardless of the installed version
    Migrate(commands::migrate::MigrateArgs),

    /// Replace this binary with the latest release
    SelfUpdate(commands::self_update::SelfUpdateArgs),

    /// Check config.toml for missing defaults and invalid values
    Doctor(commands::doctor::DoctorArgs),

    /// Rebuild the sandbox image and clear the rebuild marker
    Rebuild,

    /// Show the effective configuration
    Config,
}

impl Command {
    /// Commands that bring the config tree up to date before running.
    ///
    /// Self-managing commands run against the tree as it is: `migrate`
    /// drives the migration itself, `self-update` and `rebuild` replace
    /// artifacts, `version` only prints. Help and unknown subcommands never
    /// reach this point.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        !matches!(
            self,
            Command::Sys(
                SysCommand::Version
                    | SysCommand::Migrate(_)
                    | SysCommand::SelfUpdate(_)
                    | SysCommand::Rebuild
            )
        )
    }
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            yes,
            command,
        } = self;

        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        })?;

        let gated = command.is_gated();
        if gated {
            commands::ensure_current(&app).await?;
        }
        match command {
            Command::Sys(SysCommand::Version) => commands::version::run(&app),
            Command::Sys(SysCommand::Migrate(args)) => commands::migrate::run(&app, &args).await,
            Command::Sys(SysCommand::SelfUpdate(args)) => {
                commands::self_update::run(&app, &args).await
            }
            Command::Sys(SysCommand::Doctor(args)) => commands::doctor::run(&app, &args),
            Command::Sys(SysCommand::Rebuild) => commands::rebuild::run(&app).await,
            Command::Sys(SysCommand::Config) => commands::config::run(&app),
        }?;
        if gated {
            commands::notify_if_newer(&app);
        }
        Ok(())
    }
}
