//! Deterministic resource names derived from a canary name
//!
//! Names are reused across redeploys (via the recorded state) so a second
//! deploy finds the resources the first one created.

/// Name of the IAM policy created for a canary
pub fn policy_name(canary_name: &str) -> String {
    format!("CloudWatchSyntheticsPolicy-{canary_name}")
}

/// Name of the IAM role created for a canary
pub fn role_name(canary_name: &str) -> String {
    format!("CloudWatchSyntheticsRole-{canary_name}")
}

/// Name of the Lambda function (and layer) the synthetics service creates
/// behind a canary.
pub fn function_name(canary_name: &str, canary_id: &str) -> String {
    format!("cwsyn-{canary_name}-{canary_id}")
}

/// Log group prefix the synthetics runtime writes to
pub fn log_group_prefix(canary_name: &str) -> String {
    format!("/aws/lambda/cwsyn-{canary_name}-")
}

/// ARN of a customer-managed IAM policy
pub fn policy_arn(account_id: &str, policy_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:policy/{policy_name}")
}

/// S3 location artifacts of a canary are written to
pub fn artifact_location(bucket: &str, canary_name: &str) -> String {
    format!("s3://{bucket}/{canary_name}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iam_names() {
        assert_eq!(policy_name("c1"), "CloudWatchSyntheticsPolicy-c1");
        assert_eq!(role_name("c1"), "CloudWatchSyntheticsRole-c1");
    }

    #[test]
    fn test_function_name_combines_name_and_id() {
        assert_eq!(function_name("c1", "abc-123"), "cwsyn-c1-abc-123");
    }

    #[test]
    fn test_policy_arn() {
        assert_eq!(
            policy_arn("123456789012", "CloudWatchSyntheticsPolicy-c1"),
            "arn:aws:iam::123456789012:policy/CloudWatchSyntheticsPolicy-c1"
        );
    }

    #[test]
    fn test_artifact_location_has_trailing_slash() {
        assert_eq!(artifact_location("b1", "c1"), "s3://b1/c1/");
    }
}
