//! Settings loading for edgectl.
//!
//! Settings come from an `edgectl.toml` file (explicit path, project
//! root, or the user config directory, in that order) with environment
//! overrides for the connection fields. The `[modules]` table holds the
//! module image references resolved by the external build/push step.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_DEADLINE_SECS: u64 = 300;

/// Resolved runtime settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the hub exposing the twin store and control plane
    pub hub_url: Url,
    /// Device whose twin this invocation targets
    pub device_id: String,
    /// Bearer token for hub requests, if the hub requires one
    pub api_token: Option<String>,
    /// Seconds between deployment status polls
    pub poll_interval_secs: u64,
    /// Seconds before an unfinished rollout is treated as timed out
    pub deadline_secs: u64,
    /// Module name -> image reference, produced by the build/push step
    pub modules: BTreeMap<String, String>,
}

impl Settings {
    /// Load settings, preferring an explicit path over discovery.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let raw = match Self::locate(explicit)? {
            Some(path) => RawSettings::from_path(&path)?,
            None => RawSettings::default(),
        };
        raw.finalize()
    }

    fn locate(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            anyhow::ensure!(
                path.exists(),
                "settings file not found: {}",
                path.display()
            );
            return Ok(Some(path.to_path_buf()));
        }
        let project = std::env::current_dir()?.join("edgectl.toml");
        if project.exists() {
            return Ok(Some(project));
        }
        if let Some(dir) = dirs::config_dir() {
            let global = dir.join("edgectl").join("edgectl.toml");
            if global.exists() {
                return Ok(Some(global));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    hub_url: Option<Url>,
    device_id: Option<String>,
    api_token: Option<String>,
    poll_interval_secs: Option<u64>,
    deadline_secs: Option<u64>,
    #[serde(default)]
    modules: BTreeMap<String, String>,
}

impl RawSettings {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    fn finalize(mut self) -> anyhow::Result<Settings> {
        if let Ok(value) = std::env::var("EDGECTL_HUB_URL") {
            self.hub_url = Some(value.parse().context("EDGECTL_HUB_URL is not a valid URL")?);
        }
        if let Ok(value) = std::env::var("EDGECTL_DEVICE_ID") {
            self.device_id = Some(value);
        }
        if let Ok(value) = std::env::var("EDGECTL_API_TOKEN") {
            self.api_token = Some(value);
        }

        Ok(Settings {
            hub_url: self
                .hub_url
                .context("hub_url is not configured (set it in edgectl.toml or EDGECTL_HUB_URL)")?,
            device_id: self.device_id.context(
                "device_id is not configured (set it in edgectl.toml or EDGECTL_DEVICE_ID)",
            )?,
            api_token: self.api_token,
            poll_interval_secs: self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            deadline_secs: self.deadline_secs.unwrap_or(DEFAULT_DEADLINE_SECS),
            modules: self.modules,
        })
    }
}
