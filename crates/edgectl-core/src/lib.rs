//! Edgectl Core Library
//!
//! Provides the domain logic for rolling out containerized workloads to
//! edge devices and maintaining key/value tags on their persisted twin
//! records. Frontends drive a single `tag` pipeline: validate the tag
//! spec, optionally compose and roll out a deployment manifest, then
//! merge the tags into the device twin once the rollout has succeeded.

pub mod commands;
pub mod control;
pub mod deploy;
pub mod error;
pub mod report;
pub mod settings;
pub mod tags;
pub mod twin;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{StageError, StageResult, TemplateError};

    // Tags
    pub use crate::tags::{TagApplier, TagSpec};

    // Deployment
    pub use crate::deploy::{
        DeploymentId, DeploymentRequest, DeploymentStatus, ManifestTemplate, PollSettings,
        RolloutDriver,
    };

    // Collaborator seams
    pub use crate::control::{ControlPlane, HttpControlPlane, ScriptedControlPlane};
    pub use crate::twin::{DeviceTwin, HttpTwinStore, InMemoryTwinStore, TwinStore};

    // Pipeline
    pub use crate::commands::{DeploymentOptions, StageContext, TagCommand, TagOptions};
    pub use crate::report::StageOutcome;
    pub use crate::settings::Settings;
}
