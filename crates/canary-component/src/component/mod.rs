//! Canary reconciler and lifecycle operations
//!
//! [`CanaryComponent`] drives one canary through deploy, start, stop,
//! inspection and removal. It takes the previously recorded state as input
//! and returns what should be recorded next; persisting it is the caller's
//! job.

mod deploy;
mod lifecycle;
mod remove;

pub use lifecycle::RunLog;

use crate::aws::{CanaryDescription, CloudGateway, SyntheticsOperations};
use crate::config::DEFAULT_IAM_PROPAGATION_DELAY;
use crate::package::SourcePackager;
use crate::wait::{PollConfig, await_convergence};
use anyhow::Result;
use canary_common::CanaryState;
use std::time::Duration;

/// Orchestrates a single canary over a [`CloudGateway`]
pub struct CanaryComponent<G, P> {
    gateway: G,
    packager: P,
    poll: PollConfig,
    iam_propagation_delay: Duration,
}

impl<G: CloudGateway, P: SourcePackager> CanaryComponent<G, P> {
    pub fn new(gateway: G, packager: P) -> Self {
        Self {
            gateway,
            packager,
            poll: PollConfig::default(),
            iam_propagation_delay: DEFAULT_IAM_PROPAGATION_DELAY,
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_iam_propagation_delay(mut self, delay: Duration) -> Self {
        self.iam_propagation_delay = delay;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Re-read the canary until it leaves `transitional`.
    ///
    /// Absence also ends the wait and is returned as `None`.
    async fn settle(
        &self,
        name: &str,
        transitional: CanaryState,
    ) -> Result<Option<CanaryDescription>> {
        let synthetics = self.gateway.synthetics();
        await_convergence(
            &self.poll,
            &format!("canary {name} to leave {transitional}"),
            || synthetics.get_canary(name),
            |canary: &Option<CanaryDescription>| {
                canary.as_ref().is_some_and(|c| c.state == transitional)
            },
        )
        .await
    }
}
