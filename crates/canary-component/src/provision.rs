//! Execution role provisioning
//!
//! A canary without an explicit `roleArn` gets a dedicated managed policy
//! and role. Both are looked up by name first so redeploys reuse them.

use crate::aws::{AccountId, IamOperations};
use anyhow::Result;
use canary_common::naming;
use serde_json::json;
use std::time::Duration;
use tracing::info;

/// An IAM entity the provisioner ensured exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamResource {
    pub name: String,
    pub arn: String,
    /// Created by this call rather than found
    pub is_new: bool,
}

/// Role and policy backing a canary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRole {
    pub policy: IamResource,
    pub role: IamResource,
}

/// Permissions the synthetics runtime needs to write artifacts, logs and
/// metrics.
pub fn execution_policy_document(
    bucket: &str,
    region: &str,
    account_id: &AccountId,
    canary_name: &str,
) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Action": ["s3:PutObject", "s3:GetBucketLocation"],
                "Resource": [
                    format!("arn:aws:s3:::{bucket}"),
                    format!("arn:aws:s3:::{bucket}/*")
                ]
            },
            {
                "Effect": "Allow",
                "Action": ["logs:CreateLogStream", "logs:PutLogEvents", "logs:CreateLogGroup"],
                "Resource": [
                    format!(
                        "arn:aws:logs:{region}:{account_id}:log-group:{}*",
                        naming::log_group_prefix(canary_name)
                    )
                ]
            },
            {
                "Effect": "Allow",
                "Action": ["s3:ListAllMyBuckets"],
                "Resource": ["*"]
            },
            {
                "Effect": "Allow",
                "Resource": "*",
                "Action": "cloudwatch:PutMetricData",
                "Condition": {
                    "StringEquals": { "cloudwatch:namespace": "CloudWatchSynthetics" }
                }
            }
        ]
    })
    .to_string()
}

/// Trust policy letting Lambda assume the execution role
pub fn trust_policy_document() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "Service": "lambda.amazonaws.com" },
                "Action": "sts:AssumeRole"
            }
        ]
    })
    .to_string()
}

/// What the provisioner needs to know about the canary
#[derive(Debug, Clone, Copy)]
pub struct RoleRequest<'a> {
    pub canary_name: &'a str,
    pub policy_name: &'a str,
    pub role_name: &'a str,
    pub bucket: &'a str,
    pub region: &'a str,
    pub account_id: &'a AccountId,
}

pub async fn ensure_policy<I: IamOperations>(iam: &I, req: &RoleRequest<'_>) -> Result<IamResource> {
    let arn = naming::policy_arn(req.account_id, req.policy_name);

    if let Some(arn) = iam.get_policy_arn(&arn).await? {
        return Ok(IamResource {
            name: req.policy_name.to_string(),
            arn,
            is_new: false,
        });
    }

    let document = execution_policy_document(req.bucket, req.region, req.account_id, req.canary_name);
    let arn = iam
        .create_policy(req.policy_name, &document, req.canary_name)
        .await?;
    info!(policy = %req.policy_name, "Created execution policy");

    Ok(IamResource {
        name: req.policy_name.to_string(),
        arn,
        is_new: true,
    })
}

pub async fn ensure_role<I: IamOperations>(iam: &I, req: &RoleRequest<'_>) -> Result<IamResource> {
    if let Some(arn) = iam.get_role_arn(req.role_name).await? {
        return Ok(IamResource {
            name: req.role_name.to_string(),
            arn,
            is_new: false,
        });
    }

    let arn = iam
        .create_role(req.role_name, &trust_policy_document(), req.canary_name)
        .await?;
    info!(role = %req.role_name, "Created execution role");

    Ok(IamResource {
        name: req.role_name.to_string(),
        arn,
        is_new: true,
    })
}

/// Ensure the policy and role exist and are linked.
///
/// When either is newly created the policy is attached and the call waits
/// `propagation_delay` so the role is assumable by the time the canary is
/// created.
pub async fn ensure_execution_role<I: IamOperations>(
    iam: &I,
    req: &RoleRequest<'_>,
    propagation_delay: Duration,
) -> Result<ExecutionRole> {
    let policy = ensure_policy(iam, req).await?;
    let role = ensure_role(iam, req).await?;

    if policy.is_new || role.is_new {
        iam.attach_role_policy(&role.name, &policy.arn).await?;
        info!(
            role = %role.name,
            delay_secs = propagation_delay.as_secs(),
            "Waiting for IAM propagation"
        );
        tokio::time::sleep(propagation_delay).await;
    }

    Ok(ExecutionRole { policy, role })
}
