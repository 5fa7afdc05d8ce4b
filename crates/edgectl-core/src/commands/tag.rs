//! Tag command: the compose -> submit -> poll -> apply-tags pipeline.
//!
//! Stages run strictly sequentially and each one is a strict gate. The
//! short-circuit on a failed rollout is modeled as data (an explicit
//! `TagsSkipped` outcome) rather than ambient error propagation, so it
//! stays independently testable.

use std::path::PathBuf;

use tracing::debug;

use crate::control::ControlPlane;
use crate::deploy::{DeploymentId, DeploymentRequest, ManifestTemplate, RolloutDriver};
use crate::error::StageResult;
use crate::report::StageOutcome;
use crate::tags::{TagApplier, TagSpec};
use crate::twin::TwinStore;

use super::StageContext;

/// Options for the deployment stage.
#[derive(Debug, Clone)]
pub struct DeploymentOptions {
    /// Manifest template path
    pub template: PathBuf,
    /// Deployment name, unique per submission
    pub name: String,
    /// Target platform identifier
    pub platform: String,
    /// Rollout priority; the control plane assigns a default when absent
    pub priority: Option<u32>,
    /// Target condition expression, passed through unparsed
    pub target_condition: Option<String>,
}

impl DeploymentOptions {
    pub fn new(template: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            name: name.into(),
            platform: "amd64".to_string(),
            priority: None,
            target_condition: None,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_target_condition(mut self, condition: impl Into<String>) -> Self {
        self.target_condition = Some(condition.into());
        self
    }
}

/// Options for the tag command.
#[derive(Debug, Clone)]
pub struct TagOptions {
    /// Raw `--tags` value, validated at the pipeline boundary
    pub raw_tags: String,
    /// Deployment stage, when requested
    pub deployment: Option<DeploymentOptions>,
}

impl TagOptions {
    pub fn new(raw_tags: impl Into<String>) -> Self {
        Self {
            raw_tags: raw_tags.into(),
            deployment: None,
        }
    }

    pub fn with_deployment(mut self, deployment: DeploymentOptions) -> Self {
        self.deployment = Some(deployment);
        self
    }
}

/// Executes the tag pipeline against a [`StageContext`].
pub struct TagCommand<'a, S: TwinStore, C: ControlPlane> {
    ctx: &'a StageContext<S, C>,
}

impl<'a, S: TwinStore, C: ControlPlane> TagCommand<'a, S, C> {
    pub fn new(ctx: &'a StageContext<S, C>) -> Self {
        Self { ctx }
    }

    /// Run the pipeline. Never returns early with an error: every
    /// stage's fate ends up in the outcome sequence for rendering.
    pub async fn execute(&self, options: &TagOptions) -> Vec<StageOutcome> {
        let mut outcomes = Vec::new();

        // Validate the tag spec before any stage runs.
        let spec = match TagSpec::parse(&options.raw_tags) {
            Ok(spec) => spec,
            Err(error) => {
                outcomes.push(StageOutcome::StageFailed { error });
                return outcomes;
            }
        };

        if let Some(deployment) = &options.deployment {
            match self.run_deployment(deployment).await {
                Ok(id) => {
                    debug!(deployment = %deployment.name, %id, "rollout succeeded");
                    outcomes.push(StageOutcome::DeploymentComplete {
                        name: deployment.name.clone(),
                    });
                }
                Err(error) => {
                    outcomes.push(StageOutcome::StageFailed { error });
                    outcomes.push(StageOutcome::TagsSkipped {
                        failed_stage: "deployment",
                    });
                    return outcomes;
                }
            }
        }

        let applier = TagApplier::new(self.ctx.store());
        match applier.apply(self.ctx.device_id(), &spec).await {
            Ok(tags) => outcomes.push(StageOutcome::TagsApplied { tags }),
            Err(error) => outcomes.push(StageOutcome::StageFailed { error }),
        }

        outcomes
    }

    async fn run_deployment(&self, options: &DeploymentOptions) -> StageResult<DeploymentId> {
        // Composition failures abort before any submission.
        let template = ManifestTemplate::load(&options.template)?;
        let manifest = template.resolve(&options.platform, self.ctx.modules())?;

        let request = DeploymentRequest {
            name: options.name.clone(),
            manifest,
            priority: options.priority,
            target_condition: options.target_condition.clone(),
        };

        RolloutDriver::new(self.ctx.control(), self.ctx.poll().clone())
            .run(&request)
            .await
    }
}
