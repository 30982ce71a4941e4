//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod backup;
pub mod doctor;
pub mod migration;
pub mod rebuild_marker;
pub mod reconcile;
pub mod self_update;
pub mod sidecar;
pub mod update_notice;
pub mod update_throttle;
pub mod version_gate;

#[cfg(test)]
pub(crate) mod test_support;
