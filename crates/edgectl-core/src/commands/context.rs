//! Stage context bundling the collaborators one invocation needs.
//!
//! Replaces any process-wide shared state: the twin store handle, the
//! control-plane client, the target device, and the poll policy are an
//! explicit value threaded through each stage.

use std::collections::BTreeMap;

use crate::control::{ControlPlane, HttpControlPlane};
use crate::deploy::PollSettings;
use crate::error::StageResult;
use crate::settings::Settings;
use crate::twin::{HttpTwinStore, TwinStore};

/// Collaborators for one pipeline invocation.
pub struct StageContext<S: TwinStore, C: ControlPlane> {
    store: S,
    control: C,
    device_id: String,
    modules: BTreeMap<String, String>,
    poll: PollSettings,
}

impl StageContext<HttpTwinStore, HttpControlPlane> {
    /// Context talking to the configured hub over HTTP.
    pub fn from_settings(settings: &Settings) -> StageResult<Self> {
        Ok(Self::new(
            HttpTwinStore::new(settings)?,
            HttpControlPlane::new(settings)?,
            settings.device_id.clone(),
            settings.modules.clone(),
            PollSettings::from_settings(settings),
        ))
    }
}

impl<S: TwinStore, C: ControlPlane> StageContext<S, C> {
    pub fn new(
        store: S,
        control: C,
        device_id: impl Into<String>,
        modules: BTreeMap<String, String>,
        poll: PollSettings,
    ) -> Self {
        Self {
            store,
            control,
            device_id: device_id.into(),
            modules,
            poll,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn modules(&self) -> &BTreeMap<String, String> {
        &self.modules
    }

    pub fn poll(&self) -> &PollSettings {
        &self.poll
    }
}
