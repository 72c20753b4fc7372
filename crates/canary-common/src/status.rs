//! Canary lifecycle states
//!
//! Mirrors the `State` field the synthetics service reports for a canary.
//! States the service may add later parse as [`CanaryState::Unknown`].

use serde::{Deserialize, Serialize};

/// Lifecycle state of a canary
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CanaryState {
    Creating,
    Ready,
    Starting,
    Running,
    Updating,
    Stopping,
    Stopped,
    Error,
    Deleting,
    /// Any state this crate does not know about
    #[serde(other)]
    Unknown,
}

impl CanaryState {
    /// Parse a service state string, mapping unrecognised values to `Unknown`
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }

    /// Check if the state is in-progress work expected to settle on its own.
    ///
    /// `RUNNING` is a steady state for a scheduled canary and is not
    /// transitional even though it shares the `-ING` suffix.
    pub fn is_transitional(self) -> bool {
        matches!(
            self,
            Self::Creating | Self::Starting | Self::Updating | Self::Stopping | Self::Deleting
        )
    }
}
