//! Component-level errors
//!
//! Failures a caller may want to match on. Anything else travels as
//! `anyhow::Error` with context attached.

use canary_common::ConfigError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanaryError {
    #[error(transparent)]
    Validation(#[from] ConfigError),

    #[error("the artifact bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },

    #[error(
        "Changing the {field} from '{from}' to '{to}' will delete the AWS Synthetics Canary. \
         Please remove it manually, change the {field}, then re-deploy."
    )]
    ImmutableField {
        field: &'static str,
        from: String,
        to: String,
    },

    #[error("timed out waiting for {resource} after {waited:?} ({attempts} attempts)")]
    TimeoutExceeded {
        resource: String,
        waited: Duration,
        attempts: u32,
    },
}

impl CanaryError {
    /// Check if the error was raised before any AWS call was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CanaryError::Validation(_) | CanaryError::ImmutableField { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_field_message() {
        let err = CanaryError::ImmutableField {
            field: "region",
            from: "us-east-1".to_string(),
            to: "eu-west-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Changing the region from 'us-east-1' to 'eu-west-1' will delete the AWS \
             Synthetics Canary. Please remove it manually, change the region, then re-deploy."
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = CanaryError::from(ConfigError::MissingArtifactBucket);
        assert_eq!(err.to_string(), "required artifactBucket not set");
        assert!(err.is_validation());
    }

    #[test]
    fn test_bucket_not_found_is_not_validation() {
        let err = CanaryError::BucketNotFound {
            bucket: "b1".to_string(),
        };
        assert!(!err.is_validation());
        assert!(err.to_string().contains("'b1'"));
    }
}
