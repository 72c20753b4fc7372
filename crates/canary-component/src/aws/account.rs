//! AWS account identity

use crate::aws::context::AwsContext;
use anyhow::{Context, Result};
use tracing::debug;

/// Strongly-typed AWS account ID (12-digit string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(s: impl Into<String>) -> Self {
        AccountId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// STS client used to resolve the caller's account
pub struct StsClient {
    client: aws_sdk_sts::Client,
}

impl StsClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.sts_client(),
        }
    }

    /// Fetch the current AWS account ID via STS GetCallerIdentity
    ///
    /// Requires no special permissions; it only fails when the credentials
    /// themselves are unusable.
    pub async fn account_id(&self) -> Result<AccountId> {
        let identity = self
            .client
            .get_caller_identity()
            .send()
            .await
            .context("Failed to get AWS caller identity - check credentials")?;

        let account = identity
            .account()
            .context("No account ID returned from STS GetCallerIdentity")?;

        debug!(account_id = %account, "Resolved caller account");

        Ok(AccountId(account.to_string()))
    }
}

/// Trait for caller identity lookups.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait IdentityOperations: Send + Sync {
    /// Account the configured credentials belong to
    async fn account_id(&self) -> Result<AccountId>;
}

impl IdentityOperations for StsClient {
    async fn account_id(&self) -> Result<AccountId> {
        StsClient::account_id(self).await
    }
}
