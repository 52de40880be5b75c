//! Shared Cache Handle
//!
//! Cloneable, lock-protected handle over a [`CacheStore`] for use from
//! concurrent request handlers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;

/// Thread-safe handle to a single cache store.
///
/// Every operation that touches entries or counters takes the write lock;
/// only `stats` and the size accessors take the read lock.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<RwLock<CacheStore>>,
}

impl SharedCache {
    pub fn new(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Creates a handle around a fresh store with the given capacity.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self::new(CacheStore::new(max_entries))
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.write().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) -> Result<()> {
        self.inner.write().await.set(key, value, ttl)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn memory_bytes(&self) -> usize {
        self.inner.read().await.memory_bytes()
    }
}
