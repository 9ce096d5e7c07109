//! Prefix-isolated cache view.
//!
//! A [`CacheManager`] binds a logical cache to one (endpoint, tenant) pair
//! by prepending `<endpoint>:<tenant-or-default>:` to every key before it
//! reaches the store. Two managers with different prefixes never observe
//! each other's entries even when they share a store instance.

use std::sync::Arc;

use serde_json::Value;

use super::store::{CacheStore, NoopStore, StoreError};

const DEFAULT_TENANT: &str = "default";

#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    prefix: String,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, endpoint: &str, tenant: Option<&str>) -> Self {
        let prefix = format!("{endpoint}:{}:", tenant.unwrap_or(DEFAULT_TENANT));
        Self { store, prefix }
    }

    /// Manager over a [`NoopStore`]: indistinguishable from an empty cache.
    pub fn disabled(endpoint: &str, tenant: Option<&str>) -> Self {
        Self::new(Arc::new(NoopStore), endpoint, tenant)
    }

    /// The full prefix applied to every logical key.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.store.get(&self.physical_key(key)).await
    }

    /// Store a value under the logical key. Null payloads are rejected;
    /// encode absence by not caching.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if value.is_null() {
            return Err(StoreError::NullValue);
        }
        self.store.set(&self.physical_key(key), value).await
    }

    /// Remove entries in this logical cache. With a pattern, only keys
    /// starting with it are removed; without, the whole logical cache.
    /// Entries under other prefixes are never touched.
    pub async fn clear(&self, pattern: Option<&str>) -> Result<(), StoreError> {
        let prefix = match pattern {
            Some(pattern) => self.physical_key(pattern),
            None => self.prefix.clone(),
        };
        self.store.clear(Some(&prefix)).await
    }
}
