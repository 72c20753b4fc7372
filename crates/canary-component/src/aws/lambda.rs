//! Lambda function and layer cleanup
//!
//! The synthetics service creates a function and a versioned layer behind
//! every canary and leaves both behind when the canary is deleted.

use crate::aws::context::AwsContext;
use crate::aws::error::ignore_not_found;
use anyhow::{Context, Result};
use aws_sdk_lambda::Client;
use tracing::debug;

pub struct LambdaClient {
    client: Client,
}

impl LambdaClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.lambda_client(),
        }
    }

    /// Delete a function. Returns `false` if it was already gone.
    pub async fn delete_function(&self, function_name: &str) -> Result<bool> {
        let deleted = ignore_not_found(
            self.client
                .delete_function()
                .function_name(function_name)
                .send()
                .await,
        )
        .with_context(|| format!("Failed to delete Lambda function '{function_name}'"))?
        .is_some();

        debug!(function = %function_name, deleted, "Lambda function delete finished");
        Ok(deleted)
    }

    /// Delete every version of a layer. Returns the number of versions deleted;
    /// a layer that does not exist deletes zero versions.
    pub async fn delete_layer_versions(&self, layer_name: &str) -> Result<usize> {
        let mut versions = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let Some(page) = ignore_not_found(
                self.client
                    .list_layer_versions()
                    .layer_name(layer_name)
                    .set_marker(marker.take())
                    .send()
                    .await,
            )
            .with_context(|| format!("Failed to list versions of layer '{layer_name}'"))?
            else {
                return Ok(0);
            };

            versions.extend(page.layer_versions().iter().map(|v| v.version()));

            match page.next_marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        for version in &versions {
            debug!(layer = %layer_name, version, "Deleting layer version");
            self.client
                .delete_layer_version()
                .layer_name(layer_name)
                .version_number(*version)
                .send()
                .await
                .with_context(|| {
                    format!("Failed to delete version {version} of layer '{layer_name}'")
                })?;
        }

        Ok(versions.len())
    }
}

/// Trait for Lambda operations that can be mocked in tests.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait LambdaOperations: Send + Sync {
    async fn delete_function(&self, function_name: &str) -> Result<bool>;

    async fn delete_layer_versions(&self, layer_name: &str) -> Result<usize>;
}

impl LambdaOperations for LambdaClient {
    async fn delete_function(&self, function_name: &str) -> Result<bool> {
        LambdaClient::delete_function(self, function_name).await
    }

    async fn delete_layer_versions(&self, layer_name: &str) -> Result<usize> {
        LambdaClient::delete_layer_versions(self, layer_name).await
    }
}
