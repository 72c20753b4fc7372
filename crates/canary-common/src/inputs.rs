//! Raw manifest inputs
//!
//! Exactly what a manifest declares, before any defaulting. Every field is
//! optional; [`crate::config::CanaryConfig::resolve`] fills the gaps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired canary configuration as declared in a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CanaryInputs {
    pub name: Option<String>,
    pub artifact_bucket: Option<String>,
    /// Source bundle: a directory or a `.zip` file
    pub src: Option<String>,
    pub handler: Option<String>,
    pub runtime: Option<String>,
    pub region: Option<String>,
    /// Pre-existing execution role; when set no IAM resources are managed
    pub role_arn: Option<String>,
    pub env: Option<BTreeMap<String, String>>,
    pub tracing: Option<bool>,
    pub schedule: Option<ScheduleInputs>,
    /// Run timeout in seconds
    pub timeout: Option<i32>,
    /// Memory in MB
    pub memory: Option<i32>,
    pub retention: Option<RetentionInputs>,
    pub vpc: Option<VpcInputs>,
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScheduleInputs {
    /// `rate(...)` or `cron(...)` expression
    pub expression: Option<String>,
    /// How long, in seconds, the canary keeps running its schedule
    pub duration: Option<i64>,
}

/// Artifact retention, in days
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetentionInputs {
    pub failure: Option<i32>,
    pub success: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VpcInputs {
    pub security_groups: Option<Vec<String>>,
    pub subnets: Option<Vec<String>>,
}

impl CanaryInputs {
    /// Parse inputs from a JSON manifest
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
