//! Cache Entry Module
//!
//! Defines a stored response payload with its expiry and size estimate.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// A single cached payload plus the metadata the store needs to expire
/// and account for it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cache key the entry was stored under
    pub key: String,
    /// Opaque JSON payload
    pub value: Value,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Estimated footprint of key plus serialized value
    pub size_bytes: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry as if stored at `now` (Unix milliseconds).
    pub fn new_at(key: String, value: Value, ttl: Duration, now: u64) -> Self {
        let size_bytes = key.len() + estimate_size(&value);
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        Self {
            key,
            value,
            stored_at: now,
            expires_at: now.saturating_add(ttl_ms),
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now` (Unix milliseconds).
    ///
    /// An entry is expired once the clock reaches `expires_at`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Size of the compact JSON encoding of `value`.
pub fn estimate_size(value: &Value) -> usize {
    serde_json::to_vec(value).map(|v| v.len()).unwrap_or(0)
}
