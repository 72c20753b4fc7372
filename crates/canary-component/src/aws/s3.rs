//! S3 artifact bucket access

use crate::aws::context::AwsContext;
use crate::aws::error::ignore_not_found;
use anyhow::{Context, Result};
use aws_sdk_s3::Client;
use tracing::debug;

/// S3 client for the canary artifact bucket
pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
        }
    }

    /// Check whether a bucket exists (and is visible to the caller)
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to check bucket '{bucket}'")),
        }
    }

    /// List every object key under a prefix
    ///
    /// A missing bucket lists as empty.
    pub async fn list_object_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);

            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let Some(response) = ignore_not_found(request.send().await)
                .context("Failed to list objects")?
            else {
                return Ok(keys);
            };

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        debug!(bucket = %bucket, prefix = %prefix, count = keys.len(), "Listed objects");
        Ok(keys)
    }

    /// Fetch an object body as text, `None` if it does not exist
    pub async fn get_object_text(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        let Some(object) = ignore_not_found(
            self.client.get_object().bucket(bucket).key(key).send().await,
        )
        .with_context(|| format!("Failed to get object '{key}'"))?
        else {
            return Ok(None);
        };

        let bytes = object
            .body
            .collect()
            .await
            .context("Failed to read object body")?
            .into_bytes();

        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Trait for S3 operations that can be mocked in tests.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait S3Operations: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    async fn list_object_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    async fn get_object_text(&self, bucket: &str, key: &str) -> Result<Option<String>>;
}

impl S3Operations for S3Client {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        S3Client::bucket_exists(self, bucket).await
    }

    async fn list_object_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        S3Client::list_object_keys(self, bucket, prefix).await
    }

    async fn get_object_text(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        S3Client::get_object_text(self, bucket, key).await
    }
}
