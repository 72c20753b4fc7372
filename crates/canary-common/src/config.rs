//! Resolved canary configuration
//!
//! [`CanaryConfig::resolve`] turns raw [`CanaryInputs`] into a fully
//! populated configuration without touching the network, so the defaulting
//! rules can be tested in isolation.

use crate::defaults::{
    DEFAULT_FAILURE_RETENTION_DAYS, DEFAULT_HANDLER, DEFAULT_REGION, DEFAULT_RUNTIME,
    DEFAULT_SCHEDULE_DURATION_SECS, DEFAULT_SUCCESS_RETENTION_DAYS, DEFAULT_TIMEOUT_SECS,
    GENERATED_NAME_SUFFIX_LEN,
};
use crate::inputs::CanaryInputs;
use crate::state::RecordedState;
use std::collections::BTreeMap;
use thiserror::Error;

/// Required configuration that a manifest left unset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required artifactBucket not set")]
    MissingArtifactBucket,
    #[error("required src not set")]
    MissingSource,
    #[error("required schedule.expression not set")]
    MissingScheduleExpression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub expression: Option<String>,
    pub duration_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionConfig {
    pub failure_days: i32,
    pub success_days: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcConfig {
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
}

/// Desired canary configuration with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct CanaryConfig {
    pub name: String,
    pub artifact_bucket: Option<String>,
    pub src: Option<String>,
    pub handler: String,
    pub runtime: String,
    pub region: String,
    pub role_arn: Option<String>,
    pub env: BTreeMap<String, String>,
    pub tracing: bool,
    pub schedule: ScheduleConfig,
    pub timeout_secs: i32,
    pub memory_mb: Option<i32>,
    pub retention: RetentionConfig,
    pub vpc: Option<VpcConfig>,
    pub tags: BTreeMap<String, String>,
}

impl CanaryConfig {
    /// Apply defaults to manifest inputs.
    ///
    /// The name falls back to the previously recorded name, then to
    /// `<instance_name>-<random suffix>`.
    pub fn resolve(inputs: CanaryInputs, prior: &RecordedState, instance_name: &str) -> Self {
        let name = non_blank(inputs.name)
            .or_else(|| prior.name.clone())
            .unwrap_or_else(|| generate_name(instance_name));

        let schedule = inputs.schedule.unwrap_or_default();
        let retention = inputs.retention.unwrap_or_default();

        let vpc = inputs.vpc.and_then(|vpc| {
            let security_group_ids = vpc.security_groups.unwrap_or_default();
            let subnet_ids = vpc.subnets.unwrap_or_default();
            (!security_group_ids.is_empty() && !subnet_ids.is_empty()).then_some(VpcConfig {
                security_group_ids,
                subnet_ids,
            })
        });

        Self {
            name,
            artifact_bucket: non_blank(inputs.artifact_bucket),
            src: non_blank(inputs.src),
            handler: non_blank(inputs.handler).unwrap_or_else(|| DEFAULT_HANDLER.to_string()),
            runtime: non_blank(inputs.runtime).unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
            region: non_blank(inputs.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            role_arn: non_blank(inputs.role_arn),
            env: inputs.env.unwrap_or_default(),
            tracing: inputs.tracing.unwrap_or(false),
            schedule: ScheduleConfig {
                expression: non_blank(schedule.expression),
                duration_secs: schedule
                    .duration
                    .unwrap_or(DEFAULT_SCHEDULE_DURATION_SECS),
            },
            timeout_secs: inputs.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
            memory_mb: inputs.memory,
            retention: RetentionConfig {
                failure_days: retention.failure.unwrap_or(DEFAULT_FAILURE_RETENTION_DAYS),
                success_days: retention.success.unwrap_or(DEFAULT_SUCCESS_RETENTION_DAYS),
            },
            vpc,
            tags: inputs.tags.unwrap_or_default(),
        }
    }

    pub fn artifact_bucket(&self) -> Result<&str, ConfigError> {
        self.artifact_bucket
            .as_deref()
            .ok_or(ConfigError::MissingArtifactBucket)
    }

    pub fn src(&self) -> Result<&str, ConfigError> {
        self.src.as_deref().ok_or(ConfigError::MissingSource)
    }

    pub fn schedule_expression(&self) -> Result<&str, ConfigError> {
        self.schedule
            .expression
            .as_deref()
            .ok_or(ConfigError::MissingScheduleExpression)
    }

    /// Check that every field a deploy needs is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.artifact_bucket()?;
        self.schedule_expression()?;
        self.src()?;
        Ok(())
    }
}

/// Treat blank strings the same as absent ones
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn generate_name(instance_name: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{instance_name}-{}", &suffix[..GENERATED_NAME_SUFFIX_LEN])
}
