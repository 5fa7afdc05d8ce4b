//! Device twin model and twin store access.
//!
//! A twin is the persisted per-device record: free-form tags plus a
//! concurrency token (etag). All tag mutation goes through a
//! [`TwinStore`] conditional write; there is no client-side locking.

pub mod http;
pub mod memory;

pub use http::HttpTwinStore;
pub use memory::InMemoryTwinStore;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StageResult;

/// Persisted per-device record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTwin {
    /// Device identifier
    pub device_id: String,
    /// Application-defined tags
    #[serde(default)]
    pub tags: Map<String, Value>,
    /// Optimistic-concurrency token
    pub etag: String,
}

/// Store exposing twin reads and conditional tag writes.
#[allow(async_fn_in_trait)]
pub trait TwinStore {
    /// Fetch the current twin for a device.
    async fn get_twin(&self, device_id: &str) -> StageResult<DeviceTwin>;

    /// Replace the twin's tags, conditioned on the concurrency token
    /// observed at read time. A stale token fails with
    /// [`StageError::Concurrency`](crate::error::StageError::Concurrency).
    async fn put_tags(
        &self,
        device_id: &str,
        tags: &Map<String, Value>,
        etag: &str,
    ) -> StageResult<DeviceTwin>;
}
