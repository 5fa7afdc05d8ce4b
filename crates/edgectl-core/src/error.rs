//! Error types for edgectl stages.
//!
//! Uses `thiserror` for a closed taxonomy so the pipeline can gate later
//! stages on exactly which earlier stage failed.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for stage operations
pub type StageResult<T> = Result<T, StageError>;

/// Failures surfaced by the tag/deployment pipeline
#[derive(Debug, Error)]
pub enum StageError {
    /// The `--tags` value was not a JSON object. Carries the raw input
    /// verbatim; the display text is part of the output contract.
    #[error("Failed to add tag: '{raw}' to device")]
    TagFormat { raw: String },

    /// Manifest composition failed before any submission
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The twin's concurrency token was stale at write time
    #[error("twin for device '{device_id}' changed during update (stale etag)")]
    Concurrency { device_id: String },

    /// The twin store has no record for the device
    #[error("device '{device_id}' not found in twin store")]
    DeviceNotFound { device_id: String },

    /// The control plane reported the rollout as failed
    #[error("deployment '{name}' reported failure")]
    DeploymentFailed { name: String },

    /// No terminal status arrived before the poll deadline
    #[error("deployment '{name}' did not reach a terminal state within {deadline_secs}s")]
    DeploymentTimedOut { name: String, deadline_secs: u64 },

    /// HTTP transport failure talking to the twin store or control plane
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote side answered with something we cannot interpret
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Manifest template composition errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read deployment template {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("deployment template {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unresolved placeholder '${{{0}}}' in deployment template")]
    UnresolvedPlaceholder(String),

    #[error("no image reference for module '{0}'")]
    UnknownModule(String),
}
