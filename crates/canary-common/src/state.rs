//! Recorded state persisted between invocations
//!
//! Written after every successful deploy and cleared by a successful
//! removal. An empty record (no name) means nothing is deployed.

use crate::status::CanaryState;
use serde::{Deserialize, Serialize};

/// State recorded for a deployed canary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Bucket name the canary was created against (immutable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_bucket: Option<String>,
    /// Full artifact location reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_bucket_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CanaryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// IAM policy created by the component (absent with an explicit role)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    /// IAM role created by the component (absent with an explicit role)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

impl RecordedState {
    /// Check if nothing has been deployed
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    /// Check if the component owns IAM resources it must clean up
    pub fn manages_iam(&self) -> bool {
        self.policy_name.is_some() || self.role_name.is_some()
    }
}
