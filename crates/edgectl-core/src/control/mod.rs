//! Control-plane seam: deployment submission and status queries.

pub mod http;
pub mod memory;

pub use http::HttpControlPlane;
pub use memory::ScriptedControlPlane;

use crate::deploy::{DeploymentId, DeploymentRequest, DeploymentStatus};
use crate::error::StageResult;

/// External deployment API. Priority tie-breaking between overlapping
/// deployments is this side's contract, never computed locally.
#[allow(async_fn_in_trait)]
pub trait ControlPlane {
    /// Submit a manifest; returns the control plane's deployment id.
    async fn submit(&self, request: &DeploymentRequest) -> StageResult<DeploymentId>;

    /// Query the device-reported status of a deployment.
    async fn status(&self, id: &DeploymentId) -> StageResult<DeploymentStatus>;
}
