//! Merge a validated tag spec into a device twin.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::StageResult;
use crate::twin::TwinStore;

use super::TagSpec;

/// Applies a [`TagSpec`] to a device twin with optimistic concurrency.
///
/// The merge is a non-destructive union: spec keys overwrite existing
/// keys, untouched keys are preserved. A stale concurrency token at
/// write time surfaces as a `Concurrency` error; retry is the caller's
/// decision.
pub struct TagApplier<'a, S: TwinStore> {
    store: &'a S,
}

impl<'a, S: TwinStore> TagApplier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge the spec into the twin's tags and write back. Returns the
    /// full merged tag set as persisted.
    pub async fn apply(&self, device_id: &str, spec: &TagSpec) -> StageResult<Map<String, Value>> {
        let twin = self.store.get_twin(device_id).await?;

        let mut merged = twin.tags;
        for (key, value) in spec.entries() {
            merged.insert(key.clone(), value.clone());
        }

        debug!(device = device_id, etag = %twin.etag, "writing merged twin tags");
        let updated = self.store.put_tags(device_id, &merged, &twin.etag).await?;
        Ok(updated.tags)
    }
}
