//! HTTP twin store client.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::IF_MATCH;
use serde_json::{Map, Value};

use crate::error::{StageError, StageResult};
use crate::settings::Settings;

use super::{DeviceTwin, TwinStore};

/// Twin store backed by the hub's device twin API.
pub struct HttpTwinStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTwinStore {
    /// Creates a twin store client from settings.
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

impl TwinStore for HttpTwinStore {
    async fn get_twin(&self, device_id: &str) -> StageResult<DeviceTwin> {
        let url = format!("{}/devices/{}/twin", self.base_url, device_id);
        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else if status == StatusCode::NOT_FOUND {
            Err(StageError::DeviceNotFound {
                device_id: device_id.to_string(),
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StageError::Protocol(format!(
                "twin store returned {status}: {body}"
            )))
        }
    }

    async fn put_tags(
        &self,
        device_id: &str,
        tags: &Map<String, Value>,
        etag: &str,
    ) -> StageResult<DeviceTwin> {
        let url = format!("{}/devices/{}/twin/tags", self.base_url, device_id);
        let response = self
            .authorized(self.client.put(&url))
            .header(IF_MATCH, etag)
            .json(tags)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else if status == StatusCode::PRECONDITION_FAILED {
            Err(StageError::Concurrency {
                device_id: device_id.to_string(),
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(StageError::DeviceNotFound {
                device_id: device_id.to_string(),
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StageError::Protocol(format!(
                "twin store returned {status}: {body}"
            )))
        }
    }
}
