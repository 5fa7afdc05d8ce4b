//! In-memory twin store for tests and offline runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};

use crate::error::{StageError, StageResult};

use super::{DeviceTwin, TwinStore};

/// Twin store holding twins in a process-local map. Etags are integer
/// counters bumped on every successful write.
#[derive(Debug, Default)]
pub struct InMemoryTwinStore {
    twins: Mutex<HashMap<String, DeviceTwin>>,
    conflict_once: AtomicBool,
}

impl InMemoryTwinStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one empty twin for the given device.
    pub fn with_device(device_id: &str) -> Self {
        let store = Self::new();
        store.seed(DeviceTwin {
            device_id: device_id.to_string(),
            tags: Map::new(),
            etag: "1".to_string(),
        });
        store
    }

    /// Insert or replace a twin.
    pub fn seed(&self, twin: DeviceTwin) {
        self.lock().insert(twin.device_id.clone(), twin);
    }

    /// Current twin contents, if the device exists.
    pub fn snapshot(&self, device_id: &str) -> Option<DeviceTwin> {
        self.lock().get(device_id).cloned()
    }

    /// Make the next conditional write fail as if another writer raced
    /// this invocation between read and write.
    pub fn inject_conflict(&self) {
        self.conflict_once.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DeviceTwin>> {
        self.twins.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bump_etag(etag: &str) -> String {
        match etag.parse::<u64>() {
            Ok(n) => (n + 1).to_string(),
            Err(_) => format!("{etag}+1"),
        }
    }
}

impl TwinStore for InMemoryTwinStore {
    async fn get_twin(&self, device_id: &str) -> StageResult<DeviceTwin> {
        self.lock()
            .get(device_id)
            .cloned()
            .ok_or_else(|| StageError::DeviceNotFound {
                device_id: device_id.to_string(),
            })
    }

    async fn put_tags(
        &self,
        device_id: &str,
        tags: &Map<String, Value>,
        etag: &str,
    ) -> StageResult<DeviceTwin> {
        if self.conflict_once.swap(false, Ordering::SeqCst) {
            return Err(StageError::Concurrency {
                device_id: device_id.to_string(),
            });
        }

        let mut twins = self.lock();
        let twin = twins
            .get_mut(device_id)
            .ok_or_else(|| StageError::DeviceNotFound {
                device_id: device_id.to_string(),
            })?;

        if twin.etag != etag {
            return Err(StageError::Concurrency {
                device_id: device_id.to_string(),
            });
        }

        twin.tags = tags.clone();
        twin.etag = Self::bump_etag(&twin.etag);
        Ok(twin.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn write_bumps_the_etag() {
        let store = InMemoryTwinStore::with_device("dev-1");
        let twin = store.get_twin("dev-1").await.unwrap();

        let updated = store
            .put_tags("dev-1", &tags(&[("building", json!("9"))]), &twin.etag)
            .await
            .unwrap();

        assert_eq!(updated.etag, "2");
        assert_eq!(updated.tags["building"], json!("9"));
    }

    #[tokio::test]
    async fn stale_etag_is_a_concurrency_error() {
        let store = InMemoryTwinStore::with_device("dev-1");

        let result = store
            .put_tags("dev-1", &tags(&[("building", json!("9"))]), "0")
            .await;

        assert!(matches!(result, Err(StageError::Concurrency { .. })));
        // And the twin is untouched.
        assert!(store.snapshot("dev-1").unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn unknown_device_is_not_found() {
        let store = InMemoryTwinStore::new();
        let result = store.get_twin("ghost").await;
        assert!(matches!(result, Err(StageError::DeviceNotFound { .. })));
    }

    #[tokio::test]
    async fn injected_conflict_fails_exactly_one_write() {
        let store = InMemoryTwinStore::with_device("dev-1");
        store.inject_conflict();

        let first = store
            .put_tags("dev-1", &tags(&[("a", json!(1))]), "1")
            .await;
        assert!(matches!(first, Err(StageError::Concurrency { .. })));

        let second = store
            .put_tags("dev-1", &tags(&[("a", json!(1))]), "1")
            .await;
        assert!(second.is_ok());
    }
}
