//! Live AWS integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile CANARY_TEST_BUCKET=existing-bucket \
//!     cargo test --test aws_integration -- --ignored
//! ```

use canary_common::inputs::ScheduleInputs;
use canary_common::{CanaryConfig, CanaryInputs, CanaryState, RecordedState};
use canary_component::CanaryComponent;
use canary_component::aws::{AwsContext, AwsGateway, IamClient, S3Client, StsClient};
use canary_component::package::ZipPackager;
use canary_test_utils::aws::test_artifact_bucket;
use canary_test_utils::{get_test_region, test_canary_name};
use std::time::Duration;

async fn context() -> AwsContext {
    AwsContext::new(&get_test_region(), None, None).await
}

#[tokio::test]
#[ignore]
async fn test_caller_account_id() {
    let sts = StsClient::from_context(&context().await);
    let account = sts
        .account_id()
        .await
        .expect("AWS credentials required - set AWS_PROFILE or AWS_ACCESS_KEY_ID");

    assert_eq!(account.len(), 12, "unexpected account id {account}");
    assert!(account.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
#[ignore]
async fn test_missing_bucket_reported_absent() {
    let s3 = S3Client::from_context(&context().await);
    let bucket = format!("{}-does-not-exist", test_canary_name());

    assert!(!s3.bucket_exists(&bucket).await.unwrap());
    assert!(s3.list_object_keys(&bucket, "").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_iam_lookups_and_deletes_tolerate_absence() {
    let iam = IamClient::from_context(&context().await);
    let role = format!("CloudWatchSyntheticsRole-{}", test_canary_name());

    assert_eq!(iam.get_role_arn(&role).await.unwrap(), None);
    assert!(!iam.delete_role(&role).await.unwrap());
}

/// Full deploy, start, stop and remove cycle against a real bucket
#[tokio::test]
#[ignore]
async fn test_deploy_and_remove_canary() {
    let Some(bucket) = test_artifact_bucket() else {
        eprintln!("CANARY_TEST_BUCKET not set, skipping");
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("index.js"),
        "exports.handler = async () => { return 'ok'; };",
    )
    .unwrap();

    let inputs = CanaryInputs {
        name: Some(test_canary_name()),
        artifact_bucket: Some(bucket),
        src: Some(dir.path().display().to_string()),
        region: Some(get_test_region()),
        schedule: Some(ScheduleInputs {
            expression: Some("rate(0 minutes)".to_string()),
            duration: None,
        }),
        ..Default::default()
    };
    let config = CanaryConfig::resolve(inputs, &RecordedState::default(), "it");

    let ctx = context().await;
    let component = CanaryComponent::new(AwsGateway::from_context(&ctx), ZipPackager)
        .with_iam_propagation_delay(Duration::from_secs(10));

    let state = component
        .deploy(&config, &RecordedState::default())
        .await
        .expect("deploy should succeed");
    assert_eq!(state.name.as_deref(), Some(config.name.as_str()));
    assert_eq!(state.status, Some(CanaryState::Ready));
    assert!(state.policy_name.is_some());

    let started = component.start(&state).await.expect("start should succeed");
    assert!(started.is_some());

    component.stop(&state).await.ok();

    component.remove(&state).await.expect("remove should succeed");

    let gone = component.results(&state).await;
    assert!(gone.is_err() || gone.unwrap().is_empty());
}
