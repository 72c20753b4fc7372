//! Start, stop and inspection of a deployed canary
//!
//! Every operation here is a no-op when nothing has been deployed.

use super::CanaryComponent;
use crate::aws::{CloudGateway, S3Operations, SyntheticsOperations};
use crate::package::SourcePackager;
use anyhow::Result;
use canary_common::defaults::{LOG_OBJECT_SUFFIX, RESULTS_LIMIT};
use canary_common::{CanaryRun, CanaryState, RecordedState, most_recent_runs};
use serde::Serialize;
use tracing::{debug, info};

/// The most recent run together with its log output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunLog {
    #[serde(flatten)]
    pub run: CanaryRun,
    pub log: String,
}

impl<G: CloudGateway, P: SourcePackager> CanaryComponent<G, P> {
    /// Start the canary and wait for it to leave `STARTING`.
    ///
    /// Returns `None` when nothing is deployed.
    pub async fn start(&self, prior: &RecordedState) -> Result<Option<CanaryState>> {
        let Some(name) = prior.name.as_deref() else {
            info!("No canary deployed, nothing to start");
            return Ok(None);
        };

        info!(canary = %name, "Starting canary");
        self.gateway.synthetics().start_canary(name).await?;
        self.settled_state(name, CanaryState::Starting).await.map(Some)
    }

    /// Stop the canary and wait for it to leave `STOPPING`.
    ///
    /// Returns `None` when nothing is deployed.
    pub async fn stop(&self, prior: &RecordedState) -> Result<Option<CanaryState>> {
        let Some(name) = prior.name.as_deref() else {
            info!("No canary deployed, nothing to stop");
            return Ok(None);
        };

        info!(canary = %name, "Stopping canary");
        self.gateway.synthetics().stop_canary(name).await?;
        self.settled_state(name, CanaryState::Stopping).await.map(Some)
    }

    async fn settled_state(&self, name: &str, transitional: CanaryState) -> Result<CanaryState> {
        let canary = self
            .settle(name, transitional)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Canary '{name}' no longer exists"))?;
        info!(canary = %name, state = %canary.state, "Canary settled");
        Ok(canary.state)
    }

    /// The most recent runs, newest first
    pub async fn results(&self, prior: &RecordedState) -> Result<Vec<CanaryRun>> {
        let Some(name) = prior.name.as_deref() else {
            info!("No canary deployed, no runs to report");
            return Ok(Vec::new());
        };

        info!(canary = %name, "Retrieving canary runs");
        let runs = self.gateway.synthetics().get_canary_runs(name).await?;
        Ok(most_recent_runs(runs, RESULTS_LIMIT))
    }

    /// Log text of the most recent run.
    ///
    /// `None` when there are no runs or the run left no text log.
    pub async fn logs(&self, prior: &RecordedState) -> Result<Option<RunLog>> {
        let Some(name) = prior.name.as_deref() else {
            info!("No canary deployed, no logs to report");
            return Ok(None);
        };

        info!(canary = %name, "Retrieving canary runs");
        let runs = self.gateway.synthetics().get_canary_runs(name).await?;
        let Some(run) = most_recent_runs(runs, 1).into_iter().next() else {
            debug!(canary = %name, "No runs recorded");
            return Ok(None);
        };

        let Some((bucket, prefix)) = run.artifact_bucket_and_prefix() else {
            debug!(canary = %name, "Latest run has no artifact location");
            return Ok(None);
        };

        let s3 = self.gateway.s3();
        let keys = s3.list_object_keys(bucket, prefix).await?;
        let Some(key) = keys.iter().find(|k| k.ends_with(LOG_OBJECT_SUFFIX)) else {
            debug!(canary = %name, bucket = %bucket, prefix = %prefix, "No log object found");
            return Ok(None);
        };

        let Some(log) = s3.get_object_text(bucket, key).await? else {
            return Ok(None);
        };

        Ok(Some(RunLog { run, log }))
    }
}
