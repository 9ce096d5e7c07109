//! Cache store implementations.
//!
//! [`MemoryStore`] is the default backend: a bounded LRU with a per-entry
//! time-to-live. [`NoopStore`] satisfies the same contract while storing
//! nothing, so "caching disabled" and "cache empty" look identical to
//! callers. Custom backends (a remote cache, for instance) implement
//! [`CacheStore`] and own their own expiry policy.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use thiserror::Error;

use super::lock::mutex_lock;
use crate::config::{DEFAULT_CACHE_ENTRY_LIMIT, DEFAULT_CACHE_TTL_MS};

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A custom backend rejected the operation. Never produced by the
    /// in-memory stores.
    #[error("cache backend failure: {0}")]
    Backend(String),
    /// JSON null is not a storable payload; encode absence by not caching.
    #[error("cannot store a null cache value")]
    NullValue,
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Key/value store contract backing the cache manager.
///
/// `get` reports absence as `Ok(None)`; an `Err` always means a genuine
/// backend failure and propagates to the caller. Implementations must
/// tolerate concurrent calls from independent logical callers.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove every entry whose key starts with `prefix`, or everything
    /// when `prefix` is `None`.
    async fn clear(&self, prefix: Option<&str>) -> Result<(), StoreError>;
}

struct MemoryEntry {
    value: Value,
    stored_at: Instant,
}

/// Bounded in-memory store: LRU eviction plus a fixed time-to-live after
/// which an entry reads as absent even if not yet evicted.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, MemoryEntry>>,
    ttl: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_limits(
            DEFAULT_CACHE_ENTRY_LIMIT,
            Duration::from_millis(DEFAULT_CACHE_TTL_MS),
        )
    }

    /// Create a store with an explicit entry limit (clamped to 1) and TTL.
    pub fn with_limits(entry_limit: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(entry_limit).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) => entry.stored_at.elapsed() >= self.ttl,
            None => return Ok(None),
        };
        if expired {
            entries.pop(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if value.is_null() {
            return Err(StoreError::NullValue);
        }
        let mut entries = mutex_lock(&self.entries, SOURCE, "set");
        entries.put(
            key.to_string(),
            MemoryEntry {
                value,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn clear(&self, prefix: Option<&str>) -> Result<(), StoreError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "clear");
        match prefix {
            None => entries.clear(),
            Some(prefix) => {
                let matching: Vec<String> = entries
                    .iter()
                    .filter(|(key, _)| key.starts_with(prefix))
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in matching {
                    entries.pop(&key);
                }
            }
        }
        Ok(())
    }
}

/// Store used when caching is disabled: every read misses, writes and
/// clears are accepted and discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, value: Value) -> Result<(), StoreError> {
        if value.is_null() {
            return Err(StoreError::NullValue);
        }
        Ok(())
    }

    async fn clear(&self, _prefix: Option<&str>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn memory_roundtrip() -> Result<(), StoreError> {
        let store = MemoryStore::new();

        assert!(store.get("missing").await?.is_none());

        store.set("key", json!({"n": 1})).await?;
        assert_eq!(store.get("key").await?, Some(json!({"n": 1})));

        store.clear(None).await?;
        assert!(store.get("key").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn memory_rejects_null() {
        let store = MemoryStore::new();
        let err = store.set("key", Value::Null).await.expect_err("null set");
        assert!(matches!(err, StoreError::NullValue));
    }

    #[tokio::test]
    async fn memory_lru_eviction() -> Result<(), StoreError> {
        let store = MemoryStore::with_limits(2, Duration::from_secs(60));

        store.set("a", json!(1)).await?;
        store.set("b", json!(2)).await?;
        store.set("c", json!(3)).await?;

        // Oldest unused entry is gone.
        assert!(store.get("a").await?.is_none());
        assert_eq!(store.get("b").await?, Some(json!(2)));
        assert_eq!(store.get("c").await?, Some(json!(3)));
        Ok(())
    }

    #[tokio::test]
    async fn memory_ttl_expiry() -> Result<(), StoreError> {
        let store = MemoryStore::with_limits(10, Duration::ZERO);

        store.set("key", json!(1)).await?;
        assert!(store.get("key").await?.is_none());
        assert!(store.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn memory_clear_by_prefix() -> Result<(), StoreError> {
        let store = MemoryStore::new();

        store.set("A:one", json!(1)).await?;
        store.set("A:two", json!(2)).await?;
        store.set("B:one", json!(3)).await?;

        store.clear(Some("A:")).await?;

        assert!(store.get("A:one").await?.is_none());
        assert!(store.get("A:two").await?.is_none());
        assert_eq!(store.get("B:one").await?, Some(json!(3)));
        Ok(())
    }

    #[tokio::test]
    async fn noop_always_misses() -> Result<(), StoreError> {
        let store = NoopStore;

        store.set("key", json!(1)).await?;
        assert!(store.get("key").await?.is_none());
        store.clear(None).await?;
        Ok(())
    }
}
