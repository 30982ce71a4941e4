//! Presentation-layer implementations of `ProgressReporter`.
//!
//! Application services emit progress through the port; these adapters decide
//! whether it becomes plain lines or a spinner.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// One line per event: `→` for steps, `✓` and `!` for outcomes. Silent when
/// the context is quiet.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    fn print(&self, symbol: &str, style: owo_colors::Style, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", symbol.style(style));
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.print("→", self.ctx.styles.info, message);
    }

    fn success(&self, message: &str) {
        self.print("✓", self.ctx.styles.success, message);
    }

    fn warn(&self, message: &str) {
        self.print("!", self.ctx.styles.warning, message);
    }
}

/// Spinner-backed reporter for interactive terminals: steps update the
/// spinner, outcomes are printed above it.
pub struct SpinnerReporter<'a> {
    ctx: &'a OutputContext,
    pb: ProgressBar,
}

impl<'a> SpinnerReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext, initial: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(SPINNER_FRAMES));
        }
        pb.set_message(initial.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { ctx, pb }
    }

    /// Stop the spinner and remove it from the terminal.
    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

impl ProgressReporter for SpinnerReporter<'_> {
    fn step(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    fn success(&self, message: &str) {
        self.pb
            .println(format!("  {} {message}", "✓".style(self.ctx.styles.success)));
    }

    fn warn(&self, message: &str) {
        self.pb
            .println(format!("  {} {message}", "!".style(self.ctx.styles.warning)));
    }
}

/// Either reporter, chosen from the output context.
pub enum AnyReporter<'a> {
    Lines(TerminalReporter<'a>),
    Spinner(SpinnerReporter<'a>),
}

impl<'a> AnyReporter<'a> {
    /// Spinner when progress can be shown, plain lines otherwise.
    #[must_use]
    pub fn for_context(ctx: &'a OutputContext, initial: &str) -> Self {
        if ctx.show_progress() {
            Self::Spinner(SpinnerReporter::new(ctx, initial))
        } else {
            Self::Lines(TerminalReporter::new(ctx))
        }
    }

    pub fn finish(self) {
        if let Self::Spinner(spinner) = self {
            spinner.finish();
        }
    }
}

impl ProgressReporter for AnyReporter<'_> {
    fn step(&self, message: &str) {
        match self {
            Self::Lines(r) => r.step(message),
            Self::Spinner(r) => r.step(message),
        }
    }

    fn success(&self, message: &str) {
        match self {
            Self::Lines(r) => r.success(message),
            Self::Spinner(r) => r.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self {
            Self::Lines(r) => r.warn(message),
            Self::Spinner(r) => r.warn(message),
        }
    }
}
