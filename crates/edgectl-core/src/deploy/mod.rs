//! Deployment manifest composition and rollout driving.

pub mod request;
pub mod rollout;
pub mod template;

pub use request::{DeploymentId, DeploymentRequest, DeploymentStatus};
pub use rollout::{PollSettings, RolloutDriver};
pub use template::ManifestTemplate;
