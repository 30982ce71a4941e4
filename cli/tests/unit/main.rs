//! Unit tests for the construct CLI
//!
//! These tests drive the library API against scratch directories and run
//! fast without network or container runtimes.

mod architecture;
mod helpers;
mod upgrade_flow;
