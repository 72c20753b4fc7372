//! Removal of a canary and everything created for it

use super::CanaryComponent;
use crate::aws::{
    CloudGateway, IamOperations, IdentityOperations, LambdaOperations, SyntheticsOperations,
};
use crate::package::SourcePackager;
use anyhow::Result;
use canary_common::{CanaryState, RecordedState, naming};
use tracing::info;

impl<G: CloudGateway, P: SourcePackager> CanaryComponent<G, P> {
    /// Delete the canary, its IAM policy and role, and the function and
    /// layer the service created for it.
    ///
    /// Already-absent resources are skipped, so a removal interrupted by an
    /// error can simply be re-run. Nothing happens for an empty state.
    pub async fn remove(&self, prior: &RecordedState) -> Result<()> {
        let Some(name) = prior.name.as_deref() else {
            info!("No canary deployed, nothing to remove");
            return Ok(());
        };

        self.delete_canary(name).await?;

        if prior.manages_iam() {
            self.delete_iam(prior).await?;
        }

        if let Some(id) = prior.id.as_deref() {
            let function_name = naming::function_name(name, id);
            let lambda = self.gateway.lambda();

            info!(function = %function_name, "Removing function");
            lambda.delete_function(&function_name).await?;

            info!(layer = %function_name, "Removing layer versions");
            let deleted = lambda.delete_layer_versions(&function_name).await?;
            info!(layer = %function_name, deleted, "Layer versions removed");
        }

        info!(canary = %name, "Canary removed");
        Ok(())
    }

    /// Detach and delete the recorded policy, then delete the recorded role.
    async fn delete_iam(&self, prior: &RecordedState) -> Result<()> {
        let iam = self.gateway.iam();

        if let Some(policy_name) = prior.policy_name.as_deref() {
            let account_id = self.gateway.identity().account_id().await?;
            let policy_arn = naming::policy_arn(&account_id, policy_name);

            if let Some(role_name) = prior.role_name.as_deref() {
                info!(policy = %policy_name, role = %role_name, "Detaching policy from role");
                iam.detach_role_policy(role_name, &policy_arn).await?;
            }

            info!(policy = %policy_name, "Removing policy");
            iam.delete_policy(&policy_arn).await?;
        }

        if let Some(role_name) = prior.role_name.as_deref() {
            info!(role = %role_name, "Removing role");
            iam.delete_role(role_name).await?;
        }

        Ok(())
    }

    /// Stop the canary if it is running, delete it and wait for it to go.
    async fn delete_canary(&self, name: &str) -> Result<()> {
        let synthetics = self.gateway.synthetics();

        let Some(canary) = synthetics.get_canary(name).await? else {
            info!(canary = %name, "Canary already absent");
            return Ok(());
        };

        if canary.state == CanaryState::Running {
            info!(canary = %name, "Stopping canary before removal");
            synthetics.stop_canary(name).await?;
            self.settle(name, CanaryState::Stopping).await?;
        }

        info!(canary = %name, "Removing canary");
        synthetics.delete_canary(name).await?;
        self.settle(name, CanaryState::Deleting).await?;

        Ok(())
    }
}
