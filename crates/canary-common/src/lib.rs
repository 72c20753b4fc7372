//! canary-common - Shared types for the synthetics canary component
//!
//! This crate holds the AWS-free half of the component: what a manifest
//! declares, how omitted fields are defaulted, and what gets recorded
//! between invocations.
//!
//! ## Modules
//!
//! - [`config`]: Resolved canary configuration and its defaulting function
//! - [`defaults`]: Default configuration values
//! - [`inputs`]: Raw manifest inputs (every field optional)
//! - [`naming`]: Deterministic names for resources derived from the canary
//! - [`run`]: Canary run records and their recency ordering
//! - [`state`]: Recorded state persisted between invocations
//! - [`status`]: Canary lifecycle states
//! - [`tags`]: Tag constants applied to resources the component creates

pub mod config;
pub mod defaults;
pub mod inputs;
pub mod naming;
pub mod run;
pub mod state;
pub mod status;
pub mod tags;

// Re-export commonly used types
pub use config::{CanaryConfig, ConfigError, RetentionConfig, ScheduleConfig, VpcConfig};
pub use inputs::CanaryInputs;
pub use run::{CanaryRun, most_recent_runs};
pub use state::RecordedState;
pub use status::CanaryState;
