//! Scripted control plane for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::deploy::{DeploymentId, DeploymentRequest, DeploymentStatus};
use crate::error::{StageError, StageResult};

use super::ControlPlane;

/// Control plane that replays a scripted status sequence. The final
/// status repeats, so a script ending in a non-terminal state models a
/// rollout that never finishes.
#[derive(Debug, Default)]
pub struct ScriptedControlPlane {
    statuses: Mutex<VecDeque<DeploymentStatus>>,
    submissions: Mutex<Vec<DeploymentRequest>>,
    next_id: AtomicU64,
}

impl ScriptedControlPlane {
    pub fn new(statuses: impl IntoIterator<Item = DeploymentStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            submissions: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Every request submitted so far, in order.
    pub fn submissions(&self) -> Vec<DeploymentRequest> {
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ControlPlane for ScriptedControlPlane {
    async fn submit(&self, request: &DeploymentRequest) -> StageResult<DeploymentId> {
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(DeploymentId(format!("dep-{n}")))
    }

    async fn status(&self, _id: &DeploymentId) -> StageResult<DeploymentStatus> {
        let mut statuses = self
            .statuses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().copied()
        };
        status.ok_or_else(|| StageError::Protocol("no scripted status available".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_the_script_and_repeats_the_final_status() {
        let control = ScriptedControlPlane::new([
            DeploymentStatus::Pending,
            DeploymentStatus::Succeeded,
        ]);
        let id = DeploymentId("dep-1".to_string());

        assert_eq!(control.status(&id).await.unwrap(), DeploymentStatus::Pending);
        assert_eq!(control.status(&id).await.unwrap(), DeploymentStatus::Succeeded);
        assert_eq!(control.status(&id).await.unwrap(), DeploymentStatus::Succeeded);
    }

    #[tokio::test]
    async fn records_submissions_and_hands_out_fresh_ids() {
        let control = ScriptedControlPlane::new([DeploymentStatus::Succeeded]);
        let request = DeploymentRequest {
            name: "rollout-1".to_string(),
            manifest: json!({}),
            priority: None,
            target_condition: None,
        };

        let first = control.submit(&request).await.unwrap();
        let second = control.submit(&request).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(control.submissions().len(), 2);
    }

    #[tokio::test]
    async fn empty_script_is_a_protocol_error() {
        let control = ScriptedControlPlane::new([]);
        let id = DeploymentId("dep-1".to_string());

        let err = control.status(&id).await.unwrap_err();
        assert!(matches!(err, StageError::Protocol(_)));
    }
}
