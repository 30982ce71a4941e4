//! The Construct CLI - reproducible sandboxes for AI coding agents

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use tracing_subscriber::EnvFilter;

use construct_cli::cli::Cli;
use construct_cli::domain::EngineError;
use construct_cli::output::json;

/// Filter from `CONSTRUCT_LOG`, else `warn` (`debug` with `--verbose`).
fn init_tracing(verbose: bool, no_color: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("CONSTRUCT_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}

fn report_error(err: &anyhow::Error, as_json: bool) {
    if as_json {
        let code = EngineError::find(err).map_or("error", EngineError::code);
        match json::format_error(&format!("{err:#}"), code) {
            Ok(obj) => println!("{obj}"),
            Err(_) => eprintln!("Error: {err:#}"),
        }
    } else {
        eprintln!("Error: {err:#}");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);
    let as_json = cli.json;
    if let Err(e) = cli.run().await {
        tracing::debug!(error = ?e, "command failed");
        report_error(&e, as_json);
        std::process::exit(1);
    }
}
