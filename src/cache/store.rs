//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.
//!
//! Two policies are applied independently:
//! - expiry: checked lazily when a key is looked up (and by the periodic sweep)
//! - capacity: checked when a new key is inserted, evicting the least recently used

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::entry::{current_timestamp_ms, estimate_size};
use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

const MIN_TTL: Duration = Duration::from_millis(1);

// == Cache Store ==
/// Response cache with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Sum of live entry size estimates
    memory_bytes: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(max_entries),
            max_entries,
            memory_bytes: 0,
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`.
    ///
    /// Overwriting an existing key replaces its value and resets its TTL.
    /// Inserting a new key into a full cache evicts the least recently used entry.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Duration) -> Result<()> {
        self.set_at(key.into(), value, ttl, current_timestamp_ms())
    }

    pub(crate) fn set_at(&mut self, key: String, value: Value, ttl: Duration, now: u64) -> Result<()> {
        validate_key(&key)?;

        // expiry has millisecond resolution
        if ttl < MIN_TTL {
            return Err(CacheError::InvalidArgument(
                "TTL must be at least 1ms".to_string(),
            ));
        }

        if estimate_size(&value) > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidArgument(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(&key) {
            self.make_room(1);
        }

        let entry = CacheEntry::new_at(key.clone(), value, ttl, now);
        self.memory_bytes += entry.size_bytes;
        if let Some(old) = self.entries.insert(key.clone(), entry) {
            self.memory_bytes -= old.size_bytes;
        }

        self.lru.touch(&key);
        self.stats.set_size(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the value for `key` if present and fresh.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, current_timestamp_ms())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: u64) -> Option<Value> {
        if self.expire_if_stale(key, now) {
            debug!(key, "cache entry expired on lookup");
        }

        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry, returning whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Removes every entry. Hit, miss and eviction counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.memory_bytes = 0;
        self.stats.set_size(0);
    }

    // == Stats ==
    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ms())
    }

    pub(crate) fn cleanup_expired_at(&mut self, now: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the size estimates of all live entries.
    pub fn memory_bytes(&self) -> usize {
        self.memory_bytes
    }

    // == Expiry Policy ==
    /// Drops `key` if its entry is expired at `now`. Returns whether it was dropped.
    fn expire_if_stale(&mut self, key: &str, now: u64) -> bool {
        let stale = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now));
        if stale {
            self.remove_entry(key);
        }
        stale
    }

    // == Capacity Policy ==
    /// Evicts least recently used entries until `incoming` new entries fit.
    fn make_room(&mut self, incoming: usize) -> usize {
        let mut evicted = 0;
        while self.entries.len() + incoming > self.max_entries {
            let Some(oldest) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.memory_bytes -= entry.size_bytes;
                self.stats.record_eviction();
                evicted += 1;
                debug!(key = %oldest, "evicted least recently used entry");
            }
        }
        self.stats.set_size(self.entries.len());
        evicted
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.memory_bytes -= entry.size_bytes;
        self.stats.set_size(self.entries.len());
        Some(entry)
    }
}

/// Rejects empty keys and keys over `MAX_KEY_LENGTH` bytes.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument(
            "Key cannot be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidArgument(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
