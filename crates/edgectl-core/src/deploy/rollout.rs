//! Submit a deployment and poll it to a terminal state.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::control::ControlPlane;
use crate::error::{StageError, StageResult};
use crate::settings::Settings;

use super::request::{DeploymentId, DeploymentRequest, DeploymentStatus};

/// Poll cadence and hard deadline for one rollout.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub deadline: Duration,
}

impl PollSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: Duration::from_secs(settings.poll_interval_secs),
            deadline: Duration::from_secs(settings.deadline_secs),
        }
    }
}

/// Drives a deployment through submit -> poll -> terminal state.
///
/// Polling is bounded: a non-terminal status past the deadline becomes
/// a local `DeploymentTimedOut`, so the driver never blocks
/// indefinitely.
pub struct RolloutDriver<'a, C: ControlPlane> {
    control: &'a C,
    poll: PollSettings,
}

impl<'a, C: ControlPlane> RolloutDriver<'a, C> {
    pub fn new(control: &'a C, poll: PollSettings) -> Self {
        Self { control, poll }
    }

    /// Submit the request and wait for the rollout to succeed. Any
    /// other terminal outcome is an error; the caller must not run the
    /// tag stage after one.
    pub async fn run(&self, request: &DeploymentRequest) -> StageResult<DeploymentId> {
        let id = self.control.submit(request).await?;
        info!(deployment = %request.name, id = %id, "deployment submitted");
        self.wait_for_completion(&id, &request.name).await?;
        Ok(id)
    }

    async fn wait_for_completion(&self, id: &DeploymentId, name: &str) -> StageResult<()> {
        let started = Instant::now();

        loop {
            let status = self.control.status(id).await?;
            debug!(deployment = name, ?status, "polled deployment status");

            match status {
                DeploymentStatus::Succeeded => {
                    info!(deployment = name, "deployment reached terminal success");
                    return Ok(());
                }
                DeploymentStatus::Failed => {
                    return Err(StageError::DeploymentFailed {
                        name: name.to_string(),
                    });
                }
                DeploymentStatus::TimedOut => {
                    return Err(StageError::DeploymentTimedOut {
                        name: name.to_string(),
                        deadline_secs: self.poll.deadline.as_secs(),
                    });
                }
                DeploymentStatus::Pending
                | DeploymentStatus::Submitted
                | DeploymentStatus::Applying => {
                    if started.elapsed() >= self.poll.deadline {
                        return Err(StageError::DeploymentTimedOut {
                            name: name.to_string(),
                            deadline_secs: self.poll.deadline.as_secs(),
                        });
                    }
                    tokio::time::sleep(self.poll.interval).await;
                }
            }
        }
    }
}
