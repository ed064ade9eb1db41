// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory report store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use dialtone_core::{AdapterType, DialtoneError, HealthStatus, PluginAdapter, ReportStore};

/// A `ReportStore` backed by a `HashMap`.
///
/// Writes can be made to fail on demand to exercise persistence error paths.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` before the store is handed to the code under test.
    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.values.get_mut().insert(key.to_string(), value);
        self
    }

    /// Current raw value under `key`.
    pub async fn value(&self, key: &str) -> Option<Value> {
        self.values.lock().await.get(key).cloned()
    }

    /// Overwrite `key` behind the back of any channel cache.
    pub async fn put_raw(&self, key: &str, value: Value) {
        self.values.lock().await.insert(key.to_string(), value);
    }

    /// Make subsequent `set` calls fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DialtoneError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DialtoneError> {
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn initialize(&self) -> Result<(), DialtoneError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DialtoneError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, DialtoneError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), DialtoneError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DialtoneError::Storage {
                source: format!("injected write failure for `{key}`").into(),
            });
        }
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn seeded_values_are_readable() {
        let store = MemoryStore::new().with_value("feedback", json!([]));
        assert_eq!(store.get("feedback").await.unwrap(), Some(json!([])));
        assert_eq!(store.get("other").await.unwrap(), None);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn injected_failures_reject_writes() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let err = store.set("feedback", &json!({})).await.unwrap_err();
        assert!(matches!(err, DialtoneError::Storage { .. }));
        assert!(store.value("feedback").await.is_none());

        store.set_fail_writes(false);
        store.set("feedback", &json!({})).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
