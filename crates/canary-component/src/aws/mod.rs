//! AWS service access
//!
//! Each service gets a thin client wrapper plus an `*Operations` trait so
//! the component logic can be exercised without network access.

pub mod account;
pub mod context;
pub mod error;
pub mod gateway;
pub mod iam;
pub mod lambda;
pub mod s3;
pub mod synthetics;

pub use account::{AccountId, IdentityOperations, StsClient};
pub use context::AwsContext;
pub use error::{AwsError, classify_aws_error, ignore_not_found, is_not_found};
pub use gateway::{AwsGateway, CloudGateway};
pub use iam::{IamClient, IamOperations};
pub use lambda::{LambdaClient, LambdaOperations};
pub use s3::{S3Client, S3Operations};
pub use synthetics::{CanaryDescription, CanaryDeployment, SyntheticsClient, SyntheticsOperations};
