//! canary-component - Provision and operate an AWS CloudWatch Synthetics canary
//!
//! Given a manifest describing a canary and the state recorded by the
//! previous invocation, the component creates or updates the canary along
//! with its execution role, and supports starting, stopping, inspecting and
//! removing it.
//!
//! ## Modules
//!
//! - [`aws`]: Per-service client wrappers and mockable operations traits
//! - [`component`]: The reconciler and lifecycle operations
//! - [`provision`]: Execution role and policy provisioning
//! - [`package`]: Source bundle packaging
//! - [`state`]: SQLite store for recorded state
//! - [`wait`]: Bounded polling until a canary settles

pub mod aws;
pub mod component;
pub mod config;
pub mod error;
pub mod package;
pub mod provision;
pub mod state;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use component::{CanaryComponent, RunLog};
pub use error::CanaryError;
