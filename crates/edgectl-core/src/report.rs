//! Stage outcome reporting.
//!
//! Rendering is a pure function over the outcome sequence. The caller-
//! visible contract: every successful stage emits its own completion
//! marker line, every failure emits exactly one line starting with
//! `ERROR`, and a skipped stage emits nothing. Absence of the substring
//! `ERROR` in the rendered output is the definition of overall success.

use serde_json::{Map, Value};

use crate::error::StageError;

/// What happened to one stage of an invocation.
#[derive(Debug)]
pub enum StageOutcome {
    /// Deployment reached terminal success
    DeploymentComplete { name: String },
    /// Tags were merged and written; carries the full merged tag set
    TagsApplied { tags: Map<String, Value> },
    /// The tag stage never ran because an earlier stage failed
    TagsSkipped { failed_stage: &'static str },
    /// A stage failed
    StageFailed { error: StageError },
}

/// Render outcomes as the literal stdout contract.
pub fn render(outcomes: &[StageOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        match outcome {
            StageOutcome::DeploymentComplete { .. } => out.push_str("DEPLOYMENT COMPLETE\n"),
            StageOutcome::TagsApplied { tags } => {
                out.push_str("TAG UPDATE COMPLETE\n");
                out.push_str(&Value::Object(tags.clone()).to_string());
                out.push('\n');
            }
            StageOutcome::StageFailed { error } => {
                out.push_str(&format!("ERROR: {error}\n"));
            }
            StageOutcome::TagsSkipped { .. } => {}
        }
    }
    out
}

/// Overall success: no stage failed.
pub fn is_success(outcomes: &[StageOutcome]) -> bool {
    !outcomes
        .iter()
        .any(|outcome| matches!(outcome, StageOutcome::StageFailed { .. }))
}
