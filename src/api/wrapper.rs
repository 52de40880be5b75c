//! Cached Endpoint Wrapper
//!
//! Wraps a handler function with an optional rate limit and an optional
//! response cache. Per request the flow is:
//!
//! ```text
//! rate limit check -> rejected
//!                  -> cache lookup -> hit: respond
//!                                  -> miss: invoke -> ok: store, respond
//!                                                  -> err: respond
//! ```
//!
//! Errors are never stored. The store step runs inside the request future,
//! so a request dropped mid-handler stores nothing.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::form_urlencoded;

use crate::cache::SharedCache;
use crate::error::{CacheError, Result};
use crate::ratelimit::{RateLimitConfig, RateLimiter};

/// Response header telling observers whether the body came from the cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

// == Cache Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache without invoking the handler
    Hit,
    /// Handler invoked, result stored
    Miss,
    /// Caching disabled for this endpoint
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

// == Endpoint Config ==
/// How responses of one endpoint are cached.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub ttl: Duration,
    /// Query parameters that are part of the cache key
    pub vary_on: Vec<String>,
}

impl CachePolicy {
    pub fn new(ttl: Duration, vary_on: &[&str]) -> Self {
        Self {
            ttl,
            vary_on: vary_on.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Rate limit bucket name
    pub name: String,
    /// Route path, first part of the cache key
    pub route: String,
    /// `None` disables caching
    pub cache: Option<CachePolicy>,
    /// `None` disables rate limiting
    pub rate_limit: Option<RateLimitConfig>,
}

impl EndpointConfig {
    pub fn new(name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            cache: None,
            rate_limit: None,
        }
    }

    pub fn cached(mut self, policy: CachePolicy) -> Self {
        self.cache = Some(policy);
        self
    }

    pub fn rate_limited(mut self, limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(limit);
        self
    }
}

// == Request Identity ==
/// The parts of a request that decide its cache key and rate limit bucket.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    pub params: BTreeMap<String, String>,
    pub caller: String,
}

impl RequestIdentity {
    pub fn new(params: BTreeMap<String, String>, caller: impl Into<String>) -> Self {
        Self {
            params,
            caller: caller.into(),
        }
    }
}

// == Wrapped Response ==
/// Handler output tagged with where it came from.
#[derive(Debug, Clone)]
pub struct WrappedResponse {
    pub body: Value,
    pub cache_status: CacheStatus,
}

impl IntoResponse for WrappedResponse {
    fn into_response(self) -> Response {
        (
            [(
                HeaderName::from_static(CACHE_STATUS_HEADER),
                HeaderValue::from_static(self.cache_status.as_str()),
            )],
            Json(self.body),
        )
            .into_response()
    }
}

// == Cached Endpoint ==
#[derive(Debug, Clone)]
pub struct CachedEndpoint {
    config: EndpointConfig,
    cache: SharedCache,
    limiter: RateLimiter,
}

impl CachedEndpoint {
    pub fn new(config: EndpointConfig, cache: SharedCache, limiter: RateLimiter) -> Self {
        Self {
            config,
            cache,
            limiter,
        }
    }

    /// Cache key for `request`, or `None` when caching is disabled.
    ///
    /// Only the policy's `vary_on` parameters are included, in name order.
    /// Names and values are form-encoded, so a value containing `&` or `=`
    /// cannot collide with a different parameter set.
    pub fn cache_key(&self, request: &RequestIdentity) -> Option<String> {
        let policy = self.config.cache.as_ref()?;

        let mut vary: Vec<&str> = policy.vary_on.iter().map(String::as_str).collect();
        vary.sort_unstable();
        vary.dedup();

        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for name in vary {
            if let Some(value) = request.params.get(name) {
                query.append_pair(name, value);
                any = true;
            }
        }

        if any {
            Some(format!("{}?{}", self.config.route, query.finish()))
        } else {
            Some(self.config.route.clone())
        }
    }

    /// Runs `handler` behind the rate limit and the cache.
    pub async fn call<F, Fut, T, E>(&self, request: &RequestIdentity, handler: F) -> Result<WrappedResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        T: Serialize,
        E: Display,
    {
        self.admit(request).await?;
        self.respond(request, handler).await
    }

    /// Charges `request` against the endpoint's rate limit.
    ///
    /// Handlers that validate their input call this first and then
    /// [`respond`](Self::respond), so rejected input still uses up quota.
    pub async fn admit(&self, request: &RequestIdentity) -> Result<()> {
        match &self.config.rate_limit {
            Some(limit) => {
                self.limiter
                    .check(&self.config.name, &request.caller, limit)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Cache lookup, invoke on miss, store on success. No rate limit check.
    pub async fn respond<F, Fut, T, E>(&self, request: &RequestIdentity, handler: F) -> Result<WrappedResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        T: Serialize,
        E: Display,
    {
        let key = self.cache_key(request);

        if let Some(key) = &key {
            if let Some(body) = self.cache.get(key).await {
                debug!(endpoint = %self.config.name, key = %key, "serving cached response");
                return Ok(WrappedResponse {
                    body,
                    cache_status: CacheStatus::Hit,
                });
            }
        }

        let output = handler().await.map_err(|e| {
            error!(endpoint = %self.config.name, error = %e, "handler failed");
            CacheError::UpstreamFailure(e.to_string())
        })?;

        let body = serde_json::to_value(output).map_err(|e| {
            error!(endpoint = %self.config.name, error = %e, "failed to serialize handler output");
            CacheError::Internal("Failed to encode response".to_string())
        })?;

        let (Some(key), Some(policy)) = (key, &self.config.cache) else {
            return Ok(WrappedResponse {
                body,
                cache_status: CacheStatus::Bypass,
            });
        };

        // a failed store still serves the fresh body
        if let Err(e) = self.cache.set(key.clone(), body.clone(), policy.ttl).await {
            warn!(endpoint = %self.config.name, key = %key, error = %e, "failed to cache response");
        }

        Ok(WrappedResponse {
            body,
            cache_status: CacheStatus::Miss,
        })
    }
}
