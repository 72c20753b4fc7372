//! Create-or-update reconciliation

use super::CanaryComponent;
use crate::aws::{
    CanaryDeployment, CloudGateway, IdentityOperations, S3Operations, SyntheticsOperations,
};
use crate::error::CanaryError;
use crate::package::SourcePackager;
use crate::provision::{RoleRequest, ensure_execution_role};
use anyhow::{Context, Result};
use canary_common::{CanaryConfig, CanaryState, RecordedState, naming};
use std::path::Path;
use tracing::info;

/// Reject changes to fields that identify an existing canary.
///
/// Runs before any AWS call so a violation never leaves partial changes.
pub fn check_immutable(config: &CanaryConfig, prior: &RecordedState) -> Result<(), CanaryError> {
    let checks = [
        ("name", prior.name.as_deref(), Some(config.name.as_str())),
        ("region", prior.region.as_deref(), Some(config.region.as_str())),
        (
            "artifactBucket",
            prior.artifact_bucket.as_deref(),
            config.artifact_bucket.as_deref(),
        ),
    ];

    for (field, from, to) in checks {
        if let (Some(from), Some(to)) = (from, to) {
            if from != to {
                return Err(CanaryError::ImmutableField {
                    field,
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
    }

    Ok(())
}

impl<G: CloudGateway, P: SourcePackager> CanaryComponent<G, P> {
    /// Bring the canary in line with `config` and return the state to record.
    pub async fn deploy(
        &self,
        config: &CanaryConfig,
        prior: &RecordedState,
    ) -> Result<RecordedState> {
        if !prior.is_empty() {
            check_immutable(config, prior)?;
        }
        config.validate().map_err(CanaryError::from)?;

        let name = config.name.as_str();
        let bucket = config.artifact_bucket()?;
        let src = config.src()?;

        info!(bucket = %bucket, "Checking artifact bucket");
        if !self.gateway.s3().bucket_exists(bucket).await? {
            return Err(CanaryError::BucketNotFound {
                bucket: bucket.to_string(),
            }
            .into());
        }

        let (execution_role_arn, policy_name, role_name) = match &config.role_arn {
            Some(arn) => {
                info!(role_arn = %arn, "Using provided execution role");
                (arn.clone(), None, None)
            }
            None => {
                let policy_name = prior
                    .policy_name
                    .clone()
                    .unwrap_or_else(|| naming::policy_name(name));
                let role_name = prior
                    .role_name
                    .clone()
                    .unwrap_or_else(|| naming::role_name(name));

                info!(policy = %policy_name, role = %role_name, "Checking execution role");
                let account_id = self.gateway.identity().account_id().await?;
                let request = RoleRequest {
                    canary_name: name,
                    policy_name: &policy_name,
                    role_name: &role_name,
                    bucket,
                    region: &config.region,
                    account_id: &account_id,
                };
                let role =
                    ensure_execution_role(self.gateway.iam(), &request, self.iam_propagation_delay)
                        .await?;

                (role.role.arn, Some(policy_name), Some(role_name))
            }
        };

        info!(src = %src, "Packaging canary source");
        let code = self.packager.package(Path::new(src)).await?;

        let deployment = CanaryDeployment {
            config: config.clone(),
            execution_role_arn,
            code,
        };

        let synthetics = self.gateway.synthetics();
        let transitional = match synthetics.get_canary(name).await? {
            None => {
                info!(canary = %name, runtime = %config.runtime, "Creating canary");
                synthetics.create_canary(&deployment).await?;
                CanaryState::Creating
            }
            Some(existing) => {
                info!(canary = %name, state = %existing.state, "Updating canary");
                synthetics.update_canary(&deployment).await?;
                CanaryState::Updating
            }
        };

        self.settle(name, transitional).await?;

        let canary = synthetics
            .get_canary(name)
            .await?
            .with_context(|| format!("Canary '{name}' disappeared after deploy"))?;
        info!(canary = %name, state = %canary.state, "Canary deployed");

        Ok(RecordedState {
            id: Some(canary.id),
            name: Some(canary.name),
            artifact_bucket: Some(bucket.to_string()),
            artifact_bucket_arn: canary.artifact_location,
            runtime: canary.runtime,
            status: Some(canary.state),
            status_reason: Some(canary.state_reason).filter(|r| !r.is_empty()),
            region: Some(config.region.clone()),
            policy_name,
            role_name,
        })
    }
}
