//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod install;
pub mod layout;
pub mod packages;
pub mod reconcile;
pub mod template;
pub mod version;

pub use config::{ConstructConfig, UpdateChannel};
pub use error::{ConfigError, EngineError};
pub use layout::ConfigLayout;
pub use template::Template;
