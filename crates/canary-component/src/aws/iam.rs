//! IAM policy and role access
//!
//! Lookups report absence as `None`; deletes treat an already-absent
//! entity as success.

use crate::aws::context::AwsContext;
use crate::aws::error::ignore_not_found;
use anyhow::{Context, Result};
use aws_sdk_iam::types::Tag;
use aws_sdk_iam::Client;
use canary_common::tags::{TAG_CANARY, TAG_MANAGED_BY, TAG_MANAGED_BY_VALUE};
use tracing::debug;

/// IAM client for the canary execution role and its policy
pub struct IamClient {
    client: Client,
}

fn component_tags(canary_name: &str) -> Result<Vec<Tag>> {
    [(TAG_MANAGED_BY, TAG_MANAGED_BY_VALUE), (TAG_CANARY, canary_name)]
        .into_iter()
        .map(|(key, value)| {
            Tag::builder()
                .key(key)
                .value(value)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build IAM tag: {}", e))
        })
        .collect()
}

impl IamClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }

    /// Look up a managed policy, returning its ARN if it exists
    pub async fn get_policy_arn(&self, policy_arn: &str) -> Result<Option<String>> {
        let response = ignore_not_found(self.client.get_policy().policy_arn(policy_arn).send().await)
            .with_context(|| format!("Failed to get IAM policy '{policy_arn}'"))?;

        Ok(response.map(|r| {
            r.policy()
                .and_then(|p| p.arn())
                .unwrap_or(policy_arn)
                .to_string()
        }))
    }

    /// Create a managed policy and return its ARN
    pub async fn create_policy(
        &self,
        policy_name: &str,
        document: &str,
        canary_name: &str,
    ) -> Result<String> {
        let response = self
            .client
            .create_policy()
            .policy_name(policy_name)
            .policy_document(document)
            .description(format!("Execution policy for synthetics canary {canary_name}"))
            .set_tags(Some(component_tags(canary_name)?))
            .send()
            .await
            .with_context(|| format!("Failed to create IAM policy '{policy_name}'"))?;

        let arn = response
            .policy()
            .and_then(|p| p.arn())
            .context("No ARN returned for created IAM policy")?;

        debug!(policy_name = %policy_name, arn = %arn, "IAM policy created");
        Ok(arn.to_string())
    }

    /// Look up a role, returning its ARN if it exists
    pub async fn get_role_arn(&self, role_name: &str) -> Result<Option<String>> {
        let response = ignore_not_found(self.client.get_role().role_name(role_name).send().await)
            .with_context(|| format!("Failed to get IAM role '{role_name}'"))?;

        Ok(response.and_then(|r| r.role().map(|role| role.arn().to_string())))
    }

    /// Create a role with the given trust policy and return its ARN
    pub async fn create_role(
        &self,
        role_name: &str,
        trust_document: &str,
        canary_name: &str,
    ) -> Result<String> {
        let response = self
            .client
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_document)
            .description(format!("Execution role for synthetics canary {canary_name}"))
            .set_tags(Some(component_tags(canary_name)?))
            .send()
            .await
            .with_context(|| format!("Failed to create IAM role '{role_name}'"))?;

        let arn = response
            .role()
            .map(|role| role.arn())
            .context("No role returned for created IAM role")?;

        debug!(role_name = %role_name, arn = %arn, "IAM role created");
        Ok(arn.to_string())
    }

    pub async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .with_context(|| format!("Failed to attach '{policy_arn}' to role '{role_name}'"))?;
        Ok(())
    }

    /// Detach a policy from a role. Returns `false` if either was already gone.
    pub async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<bool> {
        let detached = ignore_not_found(
            self.client
                .detach_role_policy()
                .role_name(role_name)
                .policy_arn(policy_arn)
                .send()
                .await,
        )
        .with_context(|| format!("Failed to detach '{policy_arn}' from role '{role_name}'"))?
        .is_some();
        Ok(detached)
    }

    /// Delete a managed policy. Returns `false` if it was already gone.
    pub async fn delete_policy(&self, policy_arn: &str) -> Result<bool> {
        let deleted = ignore_not_found(
            self.client
                .delete_policy()
                .policy_arn(policy_arn)
                .send()
                .await,
        )
        .with_context(|| format!("Failed to delete IAM policy '{policy_arn}'"))?
        .is_some();
        Ok(deleted)
    }

    /// Delete a role. Returns `false` if it was already gone.
    pub async fn delete_role(&self, role_name: &str) -> Result<bool> {
        let deleted = ignore_not_found(self.client.delete_role().role_name(role_name).send().await)
            .with_context(|| format!("Failed to delete IAM role '{role_name}'"))?
            .is_some();
        Ok(deleted)
    }
}

/// Trait for IAM operations that can be mocked in tests.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait IamOperations: Send + Sync {
    async fn get_policy_arn(&self, policy_arn: &str) -> Result<Option<String>>;

    async fn create_policy(
        &self,
        policy_name: &str,
        document: &str,
        canary_name: &str,
    ) -> Result<String>;

    async fn get_role_arn(&self, role_name: &str) -> Result<Option<String>>;

    async fn create_role(
        &self,
        role_name: &str,
        trust_document: &str,
        canary_name: &str,
    ) -> Result<String>;

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<bool>;

    async fn delete_policy(&self, policy_arn: &str) -> Result<bool>;

    async fn delete_role(&self, role_name: &str) -> Result<bool>;
}

impl IamOperations for IamClient {
    async fn get_policy_arn(&self, policy_arn: &str) -> Result<Option<String>> {
        IamClient::get_policy_arn(self, policy_arn).await
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        document: &str,
        canary_name: &str,
    ) -> Result<String> {
        IamClient::create_policy(self, policy_name, document, canary_name).await
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<Option<String>> {
        IamClient::get_role_arn(self, role_name).await
    }

    async fn create_role(
        &self,
        role_name: &str,
        trust_document: &str,
        canary_name: &str,
    ) -> Result<String> {
        IamClient::create_role(self, role_name, trust_document, canary_name).await
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        IamClient::attach_role_policy(self, role_name, policy_arn).await
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<bool> {
        IamClient::detach_role_policy(self, role_name, policy_arn).await
    }

    async fn delete_policy(&self, policy_arn: &str) -> Result<bool> {
        IamClient::delete_policy(self, policy_arn).await
    }

    async fn delete_role(&self, role_name: &str) -> Result<bool> {
        IamClient::delete_role(self, role_name).await
    }
}
