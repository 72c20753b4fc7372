//! CloudWatch Synthetics canary access

use crate::aws::context::AwsContext;
use crate::aws::error::ignore_not_found;
use anyhow::{Context, Result};
use aws_sdk_synthetics::Client;
use aws_sdk_synthetics::operation::create_canary::builders::CreateCanaryFluentBuilder;
use aws_sdk_synthetics::operation::update_canary::builders::UpdateCanaryFluentBuilder;
use aws_sdk_synthetics::primitives::{Blob, DateTime as SdkDateTime};
use aws_sdk_synthetics::types::{
    CanaryCodeInput, CanaryRunConfigInput, CanaryScheduleInput, VpcConfigInput,
};
use canary_common::{CanaryConfig, CanaryRun, CanaryState, naming};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// A canary as currently reported by the service
#[derive(Debug, Clone, PartialEq)]
pub struct CanaryDescription {
    pub id: String,
    pub name: String,
    pub artifact_location: Option<String>,
    pub runtime: Option<String>,
    pub state: CanaryState,
    pub state_reason: String,
}

/// Everything a create or update call sends
#[derive(Debug, Clone, PartialEq)]
pub struct CanaryDeployment {
    pub config: CanaryConfig,
    pub execution_role_arn: String,
    /// Zip archive laid out for the runtime's layer
    pub code: Vec<u8>,
}

impl CanaryDeployment {
    fn schedule(&self) -> Result<CanaryScheduleInput> {
        let expression = self.config.schedule_expression()?;
        CanaryScheduleInput::builder()
            .expression(expression)
            .duration_in_seconds(self.config.schedule.duration_secs)
            .build()
            .context("Failed to build canary schedule")
    }

    fn code(&self) -> Result<CanaryCodeInput> {
        Ok(CanaryCodeInput::builder()
            .handler(&self.config.handler)
            .zip_file(Blob::new(self.code.clone()))
            .build())
    }

    fn run_config(&self) -> CanaryRunConfigInput {
        CanaryRunConfigInput::builder()
            .timeout_in_seconds(self.config.timeout_secs)
            .set_memory_in_mb(self.config.memory_mb)
            .set_environment_variables(Some(to_hash_map(&self.config.env)))
            .active_tracing(self.config.tracing)
            .build()
    }

    fn vpc_config(&self) -> Option<VpcConfigInput> {
        self.config.vpc.as_ref().map(|vpc| {
            VpcConfigInput::builder()
                .set_subnet_ids(Some(vpc.subnet_ids.clone()))
                .set_security_group_ids(Some(vpc.security_group_ids.clone()))
                .build()
        })
    }
}

fn to_hash_map(map: &std::collections::BTreeMap<String, String>) -> HashMap<String, String> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn to_chrono(dt: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn to_run(run: &aws_sdk_synthetics::types::CanaryRun) -> CanaryRun {
    let status = run.status();
    let timeline = run.timeline();
    CanaryRun {
        id: run.id().map(str::to_string),
        name: run.name().map(str::to_string),
        status: status
            .and_then(|s| s.state())
            .map(|s| s.as_str().to_string()),
        status_reason: status
            .and_then(|s| s.state_reason())
            .map(str::to_string),
        started: timeline.and_then(|t| t.started()).and_then(to_chrono),
        completed: timeline.and_then(|t| t.completed()).and_then(to_chrono),
        artifact_location: run.artifact_s3_location().map(str::to_string),
    }
}

/// Synthetics client for a single canary
pub struct SyntheticsClient {
    client: Client,
}

impl SyntheticsClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.synthetics_client(),
        }
    }

    /// Describe a canary, `None` if it does not exist
    pub async fn get_canary(&self, name: &str) -> Result<Option<CanaryDescription>> {
        let Some(response) = ignore_not_found(self.client.get_canary().name(name).send().await)
            .with_context(|| format!("Failed to get canary '{name}'"))?
        else {
            return Ok(None);
        };

        let Some(canary) = response.canary() else {
            return Ok(None);
        };

        let status = canary.status();
        Ok(Some(CanaryDescription {
            id: canary.id().unwrap_or_default().to_string(),
            name: canary.name().unwrap_or(name).to_string(),
            artifact_location: canary.artifact_s3_location().map(str::to_string),
            runtime: canary.runtime_version().map(str::to_string),
            state: status
                .and_then(|s| s.state())
                .map(|s| CanaryState::parse(s.as_str()))
                .unwrap_or(CanaryState::Unknown),
            state_reason: status
                .and_then(|s| s.state_reason())
                .unwrap_or_default()
                .to_string(),
        }))
    }

    pub async fn create_canary(&self, deployment: &CanaryDeployment) -> Result<()> {
        let name = &deployment.config.name;
        self.create_request(deployment)?
            .send()
            .await
            .with_context(|| format!("Failed to create canary '{name}'"))?;

        debug!(canary = %name, "CreateCanary accepted");
        Ok(())
    }

    pub async fn update_canary(&self, deployment: &CanaryDeployment) -> Result<()> {
        let name = &deployment.config.name;
        self.update_request(deployment)?
            .send()
            .await
            .with_context(|| format!("Failed to update canary '{name}'"))?;

        debug!(canary = %name, "UpdateCanary accepted");
        Ok(())
    }

    fn create_request(&self, deployment: &CanaryDeployment) -> Result<CreateCanaryFluentBuilder> {
        let config = &deployment.config;
        let bucket = config.artifact_bucket()?;

        Ok(self
            .client
            .create_canary()
            .name(&config.name)
            .runtime_version(&config.runtime)
            .execution_role_arn(&deployment.execution_role_arn)
            .schedule(deployment.schedule()?)
            .artifact_s3_location(naming::artifact_location(bucket, &config.name))
            .code(deployment.code()?)
            .run_config(deployment.run_config())
            .failure_retention_period_in_days(config.retention.failure_days)
            .success_retention_period_in_days(config.retention.success_days)
            .set_vpc_config(deployment.vpc_config())
            .set_tags((!config.tags.is_empty()).then(|| to_hash_map(&config.tags))))
    }

    /// The artifact location and tags are create-only and are not sent.
    fn update_request(&self, deployment: &CanaryDeployment) -> Result<UpdateCanaryFluentBuilder> {
        let config = &deployment.config;

        Ok(self
            .client
            .update_canary()
            .name(&config.name)
            .runtime_version(&config.runtime)
            .execution_role_arn(&deployment.execution_role_arn)
            .schedule(deployment.schedule()?)
            .code(deployment.code()?)
            .run_config(deployment.run_config())
            .failure_retention_period_in_days(config.retention.failure_days)
            .success_retention_period_in_days(config.retention.success_days)
            .set_vpc_config(deployment.vpc_config()))
    }

    pub async fn start_canary(&self, name: &str) -> Result<()> {
        self.client
            .start_canary()
            .name(name)
            .send()
            .await
            .with_context(|| format!("Failed to start canary '{name}'"))?;
        Ok(())
    }

    pub async fn stop_canary(&self, name: &str) -> Result<()> {
        self.client
            .stop_canary()
            .name(name)
            .send()
            .await
            .with_context(|| format!("Failed to stop canary '{name}'"))?;
        Ok(())
    }

    pub async fn delete_canary(&self, name: &str) -> Result<()> {
        self.client
            .delete_canary()
            .name(name)
            .send()
            .await
            .with_context(|| format!("Failed to delete canary '{name}'"))?;
        Ok(())
    }

    /// Fetch every recorded run of a canary (unordered)
    pub async fn get_canary_runs(&self, name: &str) -> Result<Vec<CanaryRun>> {
        let mut runs = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let response = self
                .client
                .get_canary_runs()
                .name(name)
                .set_next_token(next_token.take())
                .send()
                .await
                .with_context(|| format!("Failed to get runs of canary '{name}'"))?;

            runs.extend(response.canary_runs().iter().map(to_run));

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(canary = %name, count = runs.len(), "Fetched canary runs");
        Ok(runs)
    }
}

/// Trait for Synthetics operations that can be mocked in tests.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait SyntheticsOperations: Send + Sync {
    async fn get_canary(&self, name: &str) -> Result<Option<CanaryDescription>>;

    async fn create_canary(&self, deployment: &CanaryDeployment) -> Result<()>;

    async fn update_canary(&self, deployment: &CanaryDeployment) -> Result<()>;

    async fn start_canary(&self, name: &str) -> Result<()>;

    async fn stop_canary(&self, name: &str) -> Result<()>;

    async fn delete_canary(&self, name: &str) -> Result<()>;

    async fn get_canary_runs(&self, name: &str) -> Result<Vec<CanaryRun>>;
}

impl SyntheticsOperations for SyntheticsClient {
    async fn get_canary(&self, name: &str) -> Result<Option<CanaryDescription>> {
        SyntheticsClient::get_canary(self, name).await
    }

    async fn create_canary(&self, deployment: &CanaryDeployment) -> Result<()> {
        SyntheticsClient::create_canary(self, deployment).await
    }

    async fn update_canary(&self, deployment: &CanaryDeployment) -> Result<()> {
        SyntheticsClient::update_canary(self, deployment).await
    }

    async fn start_canary(&self, name: &str) -> Result<()> {
        SyntheticsClient::start_canary(self, name).await
    }

    async fn stop_canary(&self, name: &str) -> Result<()> {
        SyntheticsClient::stop_canary(self, name).await
    }

    async fn delete_canary(&self, name: &str) -> Result<()> {
        SyntheticsClient::delete_canary(self, name).await
    }

    async fn get_canary_runs(&self, name: &str) -> Result<Vec<CanaryRun>> {
        SyntheticsClient::get_canary_runs(self, name).await
    }
}
