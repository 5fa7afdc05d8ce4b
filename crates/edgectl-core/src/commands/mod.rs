//! High-level commands for edgectl operations.
//!
//! This module provides the public API for the tag/deployment pipeline.
//! Frontends build a [`StageContext`] and [`TagOptions`], execute the
//! command, and render the returned outcomes.

pub mod context;
pub mod tag;

pub use context::StageContext;
pub use tag::{DeploymentOptions, TagCommand, TagOptions};
