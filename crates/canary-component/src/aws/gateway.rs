//! Bundle of the service operations the component needs
//!
//! The component is generic over [`CloudGateway`] so tests can swap every
//! service for an in-memory fake at once.

use crate::aws::account::{IdentityOperations, StsClient};
use crate::aws::context::AwsContext;
use crate::aws::iam::{IamClient, IamOperations};
use crate::aws::lambda::{LambdaClient, LambdaOperations};
use crate::aws::s3::{S3Client, S3Operations};
use crate::aws::synthetics::{SyntheticsClient, SyntheticsOperations};

/// Access to each AWS service the component talks to
pub trait CloudGateway: Send + Sync {
    type Synthetics: SyntheticsOperations;
    type Iam: IamOperations;
    type S3: S3Operations;
    type Lambda: LambdaOperations;
    type Identity: IdentityOperations;

    fn synthetics(&self) -> &Self::Synthetics;
    fn iam(&self) -> &Self::Iam;
    fn s3(&self) -> &Self::S3;
    fn lambda(&self) -> &Self::Lambda;
    fn identity(&self) -> &Self::Identity;
}

/// Gateway backed by real SDK clients for one region
pub struct AwsGateway {
    synthetics: SyntheticsClient,
    iam: IamClient,
    s3: S3Client,
    lambda: LambdaClient,
    sts: StsClient,
}

impl AwsGateway {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            synthetics: SyntheticsClient::from_context(ctx),
            iam: IamClient::from_context(ctx),
            s3: S3Client::from_context(ctx),
            lambda: LambdaClient::from_context(ctx),
            sts: StsClient::from_context(ctx),
        }
    }
}

impl CloudGateway for AwsGateway {
    type Synthetics = SyntheticsClient;
    type Iam = IamClient;
    type S3 = S3Client;
    type Lambda = LambdaClient;
    type Identity = StsClient;

    fn synthetics(&self) -> &SyntheticsClient {
        &self.synthetics
    }

    fn iam(&self) -> &IamClient {
        &self.iam
    }

    fn s3(&self) -> &S3Client {
        &self.s3
    }

    fn lambda(&self) -> &LambdaClient {
        &self.lambda
    }

    fn identity(&self) -> &StsClient {
        &self.sts
    }
}
