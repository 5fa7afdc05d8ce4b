//! Deployment request and status types shared with the control plane.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One deployment submission. Not persisted by this tool past its
/// terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRequest {
    /// Unique name per submission
    pub name: String,
    /// Composed manifest content
    pub manifest: Value,
    /// Rollout priority. When omitted the control plane assigns its own
    /// default; this tool never invents one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Boolean expression over device attributes/tags selecting which
    /// devices the deployment applies to. Opaque to this tool.
    #[serde(rename = "targetCondition", skip_serializing_if = "Option::is_none")]
    pub target_condition: Option<String>,
}

/// Control-plane handle for a submitted deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentId(pub String);

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Device-reported rollout state.
///
/// `TimedOut` is also assigned locally when the poll deadline elapses
/// before a terminal report arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Submitted,
    Applying,
    Succeeded,
    Failed,
    TimedOut,
}

impl DeploymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }
}
