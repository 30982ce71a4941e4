//! `CommandRunner` over `tokio::process`.
//!
//! Children are spawned with `kill_on_drop`, so abandoning the wait on timeout
//! also terminates the runtime CLI.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::application::ports::CommandRunner;

/// Default timeout for container runtime queries (`rmi`, `version`).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for image builds, which download base layers and packages.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn command(program: &str, args: &[&str]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);
    cmd
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let child = command(program, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        tracing::debug!(%program, ?args, "spawned");

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output.with_context(|| format!("waiting for {program}")),
            Err(_) => anyhow::bail!("{program} timed out after {}s", timeout.as_secs()),
        }
    }

    /// Inherits stdio so build output streams to the terminal.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        let status = tokio::time::timeout(self.timeout, command(program, args).status()).await;
        match status {
            Ok(status) => status.with_context(|| format!("failed to run {program}")),
            Err(_) => anyhow::bail!("{program} timed out after {}s", self.timeout.as_secs()),
        }
    }
}
