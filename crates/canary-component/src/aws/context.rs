//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once per
//! invocation and creating every service client from the same config.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

/// Shared AWS configuration context for creating service clients.
///
/// The loaded config is immutable: region, profile and endpoint are fixed
/// at construction and nothing process-wide is touched.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::new("us-east-1", None, None).await;
///
/// let synthetics = SyntheticsClient::from_context(&aws);
/// let iam = IamClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    custom_endpoint: bool,
}

impl AwsContext {
    /// Load AWS configuration for the specified region.
    ///
    /// Credentials come from the standard provider chain, optionally
    /// narrowed to a named profile. An endpoint URL routes every service to
    /// a single endpoint (LocalStack and similar).
    pub async fn new(region: &str, profile: Option<&str>, endpoint_url: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }

        Self {
            config: Arc::new(loader.load().await),
            custom_endpoint: endpoint_url.is_some(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn synthetics_client(&self) -> aws_sdk_synthetics::Client {
        aws_sdk_synthetics::Client::new(self.sdk_config())
    }

    pub fn iam_client(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(self.sdk_config())
    }

    pub fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(self.sdk_config())
    }

    pub fn lambda_client(&self) -> aws_sdk_lambda::Client {
        aws_sdk_lambda::Client::new(self.sdk_config())
    }

    /// Create an S3 client. Custom endpoints get path-style addressing
    /// since they rarely serve virtual-hosted bucket names.
    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        let config = aws_sdk_s3::config::Builder::from(self.sdk_config())
            .force_path_style(self.custom_endpoint)
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.config.region())
            .field("custom_endpoint", &self.custom_endpoint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_keeps_region() {
        let ctx = AwsContext::new("eu-west-1", None, Some("http://localhost:4566")).await;
        assert_eq!(
            ctx.sdk_config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );
    }

    #[tokio::test]
    async fn test_context_clone_shares_config() {
        let ctx1 = AwsContext::new("us-east-1", None, None).await;
        let ctx2 = ctx1.clone();
        assert!(Arc::ptr_eq(&ctx1.config, &ctx2.config));
    }
}
