//! HTTP control-plane client.

use std::time::Duration;

use serde::Deserialize;

use crate::deploy::{DeploymentId, DeploymentRequest, DeploymentStatus};
use crate::error::{StageError, StageResult};
use crate::settings::Settings;

use super::ControlPlane;

/// Control plane backed by the hub's deployment API.
pub struct HttpControlPlane {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: DeploymentStatus,
}

impl HttpControlPlane {
    /// Creates a control-plane client from settings.
    pub fn new(settings: &Settings) -> StageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.hub_url.as_str().trim_end_matches('/').to_string(),
            token: settings.api_token.clone(),
        })
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

impl ControlPlane for HttpControlPlane {
    async fn submit(&self, request: &DeploymentRequest) -> StageResult<DeploymentId> {
        let url = format!("{}/deployments", self.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: SubmitResponse = response.json().await?;
            Ok(DeploymentId(body.id))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StageError::Protocol(format!(
                "deployment submit returned {status}: {body}"
            )))
        }
    }

    async fn status(&self, id: &DeploymentId) -> StageResult<DeploymentStatus> {
        let url = format!("{}/deployments/{}", self.base_url, id);
        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if status.is_success() {
            let body: StatusResponse = response.json().await?;
            Ok(body.status)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StageError::Protocol(format!(
                "deployment status returned {status}: {body}"
            )))
        }
    }
}
