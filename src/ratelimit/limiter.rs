//! Fixed Window Rate Limiter
//!
//! Counts requests per `(bucket, caller)` pair inside a fixed window that
//! opens on the caller's first request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};

// == Rate Limit Config ==
/// Request quota for one endpoint: at most `requests` calls per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    /// Creates a validated quota. Both parameters must be positive.
    pub fn new(requests: u32, window: Duration) -> Result<Self> {
        if requests == 0 {
            return Err(CacheError::InvalidArgument(
                "Rate limit request count must be positive".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(CacheError::InvalidArgument(
                "Rate limit window must be positive".to_string(),
            ));
        }
        Ok(Self { requests, window })
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    length: Duration,
    count: u32,
}

impl Window {
    fn is_over(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.length
    }
}

// == Rate Limiter ==
/// Shared per-caller request counter. Clones share the same windows.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one request from `caller` against `bucket`.
    ///
    /// Fails with `RateLimited` once the caller has used up the quota for
    /// the current window. Rejected requests do not extend the window.
    pub async fn check(&self, bucket: &str, caller: &str, config: &RateLimitConfig) -> Result<()> {
        self.check_at(bucket, caller, config, Instant::now()).await
    }

    pub(crate) async fn check_at(
        &self,
        bucket: &str,
        caller: &str,
        config: &RateLimitConfig,
        now: Instant,
    ) -> Result<()> {
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry(format!("{}|{}", bucket, caller))
            .or_insert(Window {
                started: now,
                length: config.window,
                count: 0,
            });

        if window.is_over(now) {
            *window = Window {
                started: now,
                length: config.window,
                count: 0,
            };
        }

        if window.count >= config.requests {
            let remaining = window.length.saturating_sub(now.duration_since(window.started));
            // round up so clients never retry a moment too early
            let retry_after_secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            warn!(bucket, caller, retry_after_secs, "rate limit exceeded");
            return Err(CacheError::RateLimited {
                retry_after_secs: retry_after_secs.max(1),
            });
        }

        window.count += 1;
        Ok(())
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    pub async fn prune(&self) -> usize {
        self.prune_at(Instant::now()).await
    }

    pub(crate) async fn prune_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| !window.is_over(now));
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, "pruned stale rate limit windows");
        }
        removed
    }

    /// Number of windows currently tracked.
    pub async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}
