//! In-memory test doubles for the component.
//!
//! [`FakeCloud`] implements every service operations trait, records each
//! call in order and replays a scripted sequence of canary states.

use crate::aws::{
    AccountId, CanaryDeployment, CanaryDescription, CloudGateway, IamOperations,
    IdentityOperations, LambdaOperations, S3Operations, SyntheticsOperations,
};
use crate::component::CanaryComponent;
use crate::package::SourcePackager;
use crate::wait::PollConfig;
use anyhow::Result;
use canary_common::defaults::DEFAULT_RUNTIME;
use canary_common::inputs::ScheduleInputs;
use canary_common::{CanaryConfig, CanaryInputs, CanaryRun, CanaryState, RecordedState, naming};
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const TEST_ACCOUNT_ID: &str = "123456789012";
pub const TEST_CANARY_ID: &str = "abc123";

/// Recording fake of all AWS services
#[derive(Default)]
pub struct FakeCloud {
    calls: Mutex<Vec<String>>,
    /// Successive `get_canary` results; the last one repeats
    canary: Mutex<VecDeque<Option<CanaryDescription>>>,
    missing_bucket: bool,
    policies: Mutex<BTreeSet<String>>,
    roles: Mutex<BTreeSet<String>>,
    runs: Vec<CanaryRun>,
    objects: BTreeMap<(String, String), String>,
    deployments: Mutex<Vec<CanaryDeployment>>,
    fail_on: Option<String>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canary_states(
        self,
        name: &str,
        states: impl IntoIterator<Item = Option<CanaryState>>,
    ) -> Self {
        *self.canary.lock().unwrap() = states
            .into_iter()
            .map(|state| state.map(|state| describe(name, state)))
            .collect();
        self
    }

    pub fn with_missing_bucket(mut self) -> Self {
        self.missing_bucket = true;
        self
    }

    /// Pretend a previous deploy already created the policy and role
    pub fn with_existing_iam(self, canary_name: &str) -> Self {
        self.policies.lock().unwrap().insert(naming::policy_arn(
            TEST_ACCOUNT_ID,
            &naming::policy_name(canary_name),
        ));
        self.roles
            .lock()
            .unwrap()
            .insert(naming::role_name(canary_name));
        self
    }

    pub fn with_runs(mut self, runs: Vec<CanaryRun>) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_object(mut self, bucket: &str, key: &str, text: &str) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), text.to_string());
        self
    }

    /// Fail every call whose log entry starts with `prefix`
    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn deployments(&self) -> Vec<CanaryDeployment> {
        self.deployments.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        let fail = self
            .fail_on
            .as_deref()
            .is_some_and(|prefix| call.starts_with(prefix));
        self.calls.lock().unwrap().push(call.clone());
        if fail {
            anyhow::bail!("injected failure: {call}");
        }
        Ok(())
    }
}

fn describe(name: &str, state: CanaryState) -> CanaryDescription {
    CanaryDescription {
        id: TEST_CANARY_ID.to_string(),
        name: name.to_string(),
        artifact_location: Some(format!("b1/{name}")),
        runtime: Some(DEFAULT_RUNTIME.to_string()),
        state,
        state_reason: String::new(),
    }
}

impl SyntheticsOperations for FakeCloud {
    async fn get_canary(&self, name: &str) -> Result<Option<CanaryDescription>> {
        self.record(format!("synthetics.get_canary {name}"))?;
        let mut script = self.canary.lock().unwrap();
        let next = if script.len() > 1 {
            script.pop_front().flatten()
        } else {
            script.front().cloned().flatten()
        };
        Ok(next)
    }

    async fn create_canary(&self, deployment: &CanaryDeployment) -> Result<()> {
        self.record(format!("synthetics.create_canary {}", deployment.config.name))?;
        self.deployments.lock().unwrap().push(deployment.clone());
        Ok(())
    }

    async fn update_canary(&self, deployment: &CanaryDeployment) -> Result<()> {
        self.record(format!("synthetics.update_canary {}", deployment.config.name))?;
        self.deployments.lock().unwrap().push(deployment.clone());
        Ok(())
    }

    async fn start_canary(&self, name: &str) -> Result<()> {
        self.record(format!("synthetics.start_canary {name}"))
    }

    async fn stop_canary(&self, name: &str) -> Result<()> {
        self.record(format!("synthetics.stop_canary {name}"))
    }

    async fn delete_canary(&self, name: &str) -> Result<()> {
        self.record(format!("synthetics.delete_canary {name}"))
    }

    async fn get_canary_runs(&self, name: &str) -> Result<Vec<CanaryRun>> {
        self.record(format!("synthetics.get_canary_runs {name}"))?;
        Ok(self.runs.clone())
    }
}

impl IamOperations for FakeCloud {
    async fn get_policy_arn(&self, policy_arn: &str) -> Result<Option<String>> {
        self.record(format!("iam.get_policy_arn {policy_arn}"))?;
        Ok(self
            .policies
            .lock()
            .unwrap()
            .contains(policy_arn)
            .then(|| policy_arn.to_string()))
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        _document: &str,
        _canary_name: &str,
    ) -> Result<String> {
        self.record(format!("iam.create_policy {policy_name}"))?;
        let arn = naming::policy_arn(TEST_ACCOUNT_ID, policy_name);
        self.policies.lock().unwrap().insert(arn.clone());
        Ok(arn)
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<Option<String>> {
        self.record(format!("iam.get_role_arn {role_name}"))?;
        Ok(self
            .roles
            .lock()
            .unwrap()
            .contains(role_name)
            .then(|| role_arn(role_name)))
    }

    async fn create_role(
        &self,
        role_name: &str,
        _trust_document: &str,
        _canary_name: &str,
    ) -> Result<String> {
        self.record(format!("iam.create_role {role_name}"))?;
        self.roles.lock().unwrap().insert(role_name.to_string());
        Ok(role_arn(role_name))
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.record(format!("iam.attach_role_policy {role_name} {policy_arn}"))
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<bool> {
        self.record(format!("iam.detach_role_policy {role_name} {policy_arn}"))?;
        Ok(self.roles.lock().unwrap().contains(role_name))
    }

    async fn delete_policy(&self, policy_arn: &str) -> Result<bool> {
        self.record(format!("iam.delete_policy {policy_arn}"))?;
        Ok(self.policies.lock().unwrap().remove(policy_arn))
    }

    async fn delete_role(&self, role_name: &str) -> Result<bool> {
        self.record(format!("iam.delete_role {role_name}"))?;
        Ok(self.roles.lock().unwrap().remove(role_name))
    }
}

fn role_arn(role_name: &str) -> String {
    format!("arn:aws:iam::{TEST_ACCOUNT_ID}:role/{role_name}")
}

impl S3Operations for FakeCloud {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.record(format!("s3.bucket_exists {bucket}"))?;
        Ok(!self.missing_bucket)
    }

    async fn list_object_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        self.record(format!("s3.list_object_keys {bucket} {prefix}"))?;
        Ok(self
            .objects
            .keys()
            .filter(|(b, key)| b == bucket && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn get_object_text(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        self.record(format!("s3.get_object_text {bucket} {key}"))?;
        Ok(self
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }
}

impl LambdaOperations for FakeCloud {
    async fn delete_function(&self, function_name: &str) -> Result<bool> {
        self.record(format!("lambda.delete_function {function_name}"))?;
        Ok(true)
    }

    async fn delete_layer_versions(&self, layer_name: &str) -> Result<usize> {
        self.record(format!("lambda.delete_layer_versions {layer_name}"))?;
        Ok(1)
    }
}

impl IdentityOperations for FakeCloud {
    async fn account_id(&self) -> Result<AccountId> {
        self.record("sts.account_id".to_string())?;
        Ok(AccountId::new(TEST_ACCOUNT_ID))
    }
}

impl CloudGateway for FakeCloud {
    type Synthetics = Self;
    type Iam = Self;
    type S3 = Self;
    type Lambda = Self;
    type Identity = Self;

    fn synthetics(&self) -> &Self {
        self
    }

    fn iam(&self) -> &Self {
        self
    }

    fn s3(&self) -> &Self {
        self
    }

    fn lambda(&self) -> &Self {
        self
    }

    fn identity(&self) -> &Self {
        self
    }
}

/// Packager returning a fixed archive
#[derive(Debug, Default)]
pub struct FakePackager;

impl SourcePackager for FakePackager {
    async fn package(&self, _src: &Path) -> Result<Vec<u8>> {
        Ok(b"fake-archive".to_vec())
    }
}

/// Component over the fakes with a 1s poll interval and the usual IAM delay
pub fn component(fake: FakeCloud) -> CanaryComponent<FakeCloud, FakePackager> {
    CanaryComponent::new(fake, FakePackager)
        .with_poll_config(PollConfig {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        })
        .with_iam_propagation_delay(Duration::from_secs(6))
}

/// Valid resolved configuration for a canary in bucket `b1`
pub fn config_for(name: &str) -> CanaryConfig {
    let inputs = CanaryInputs {
        name: Some(name.to_string()),
        artifact_bucket: Some("b1".to_string()),
        src: Some("./canary".to_string()),
        schedule: Some(ScheduleInputs {
            expression: Some("rate(5 minutes)".to_string()),
            duration: None,
        }),
        ..Default::default()
    };
    CanaryConfig::resolve(inputs, &RecordedState::default(), "inst")
}

/// A passed run completed at 12:`minute` on 2024-01-01
pub fn run_completed_at(id: &str, minute: Option<u32>) -> CanaryRun {
    let completed = minute.and_then(|m| Utc.with_ymd_and_hms(2024, 1, 1, 12, m, 0).single());
    CanaryRun {
        id: Some(id.to_string()),
        name: Some("c1".to_string()),
        status: Some("PASSED".to_string()),
        status_reason: None,
        started: completed,
        completed,
        artifact_location: None,
    }
}

/// Collects formatted tracing output for assertions on narration
#[derive(Clone, Default)]
pub struct LogCapture(std::sync::Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route events on the current thread here until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
