//! API Handlers
//!
//! HTTP request handlers for the cache operations endpoints and the cached
//! voiceover listing.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::api::wrapper::{CachePolicy, CachedEndpoint, EndpointConfig, RequestIdentity, WrappedResponse};
use crate::cache::{CacheStore, SharedCache};
use crate::catalog::{CatalogError, InMemoryCatalog, VoiceCatalog};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{ClearResponse, HealthResponse, MetricsResponse, VoiceoverQuery};
use crate::ratelimit::{caller_id, RateLimitConfig, RateLimiter};

/// Application state shared across all handlers.
///
/// Holds one cache store and one rate limiter, shared by every endpoint.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    pub limiter: RateLimiter,
    pub catalog: Arc<dyn VoiceCatalog>,
    pub metrics: CachedEndpoint,
    pub voiceovers: CachedEndpoint,
}

impl AppState {
    /// Wires the endpoints around an explicitly constructed cache and catalog.
    pub fn new(config: &Config, cache: CacheStore, catalog: Arc<dyn VoiceCatalog>) -> Result<Self> {
        config.validate()?;

        let cache = SharedCache::new(cache);
        let limiter = RateLimiter::new();
        let window = Duration::from_secs(config.rate_limit_window);

        let metrics = CachedEndpoint::new(
            EndpointConfig::new("cache-metrics", "/cache/metrics")
                .rate_limited(RateLimitConfig::new(config.metrics_rate_limit, window)?),
            cache.clone(),
            limiter.clone(),
        );

        let voiceovers = CachedEndpoint::new(
            EndpointConfig::new("voiceovers", "/api/voiceovers")
                .cached(CachePolicy::new(
                    Duration::from_secs(config.default_ttl),
                    &["group", "limit"],
                ))
                .rate_limited(RateLimitConfig::new(config.api_rate_limit, window)?),
            cache.clone(),
            limiter.clone(),
        );

        Ok(Self {
            cache,
            limiter,
            catalog,
            metrics,
            voiceovers,
        })
    }

    /// Creates the state from configuration with the seeded in-memory catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config,
            CacheStore::new(config.max_entries),
            Arc::new(InMemoryCatalog::seeded()),
        )
    }
}

/// Handler for GET /cache/metrics
///
/// Rate limited per caller; never cached.
pub async fn metrics_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<WrappedResponse> {
    let request = RequestIdentity::new(BTreeMap::new(), caller_id(&headers));
    let cache = state.cache.clone();

    state
        .metrics
        .call(&request, || async move {
            Ok::<_, Infallible>(MetricsResponse::from_stats(cache.stats().await))
        })
        .await
}

/// Handler for POST /cache/clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.cache.len().await;
    state.cache.clear().await;
    info!(removed, "cache cleared");

    Ok(Json(ClearResponse::cleared()))
}

/// Handler for GET /api/voiceovers
///
/// Lists voiceovers from the catalog, cached per `group` and `limit`.
pub async fn voiceovers_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<WrappedResponse> {
    let request = RequestIdentity::new(params, caller_id(&headers));
    state.voiceovers.admit(&request).await?;

    let query = parse_voiceover_query(&request.params)?;
    let catalog = state.catalog.clone();

    state
        .voiceovers
        .respond(&request, || async move {
            let docs = catalog.list(&query)?;
            let total = docs.len();
            Ok::<_, CatalogError>(json!({
                "docs": docs,
                "totalDocs": total,
            }))
        })
        .await
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn parse_voiceover_query(params: &BTreeMap<String, String>) -> Result<VoiceoverQuery> {
    let limit = params
        .get("limit")
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| CacheError::InvalidArgument("limit must be a number".to_string()))
        })
        .transpose()?;

    let query = VoiceoverQuery {
        group: params.get("group").cloned(),
        limit,
    };

    match query.validate() {
        Some(msg) => Err(CacheError::InvalidArgument(msg)),
        None => Ok(query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::wrapper::CacheStatus;

    fn test_state() -> AppState {
        AppState::from_config(&Config::default()).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_voiceovers_handler_caches() {
        let state = test_state();

        let first = voiceovers_handler(
            State(state.clone()),
            HeaderMap::new(),
            Query(params(&[("group", "commercial")])),
        )
        .await
        .unwrap();
        let second = voiceovers_handler(
            State(state.clone()),
            HeaderMap::new(),
            Query(params(&[("group", "commercial")])),
        )
        .await
        .unwrap();

        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.body["totalDocs"], 2);
    }

    #[tokio::test]
    async fn test_voiceovers_handler_rejects_bad_limit() {
        let state = test_state();

        let result = voiceovers_handler(
            State(state.clone()),
            HeaderMap::new(),
            Query(params(&[("limit", "lots")])),
        )
        .await;

        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        assert!(state.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_requests_use_up_quota() {
        let config = Config {
            api_rate_limit: 2,
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.1.1.1".parse().unwrap());

        for _ in 0..2 {
            let result = voiceovers_handler(
                State(state.clone()),
                headers.clone(),
                Query(params(&[("limit", "lots")])),
            )
            .await;
            assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        }

        let result = voiceovers_handler(
            State(state.clone()),
            headers,
            Query(params(&[("group", "commercial")])),
        )
        .await;
        assert!(matches!(result, Err(CacheError::RateLimited { .. })));
        assert_eq!(state.cache.stats().await.misses, 0);
    }

    #[tokio::test]
    async fn test_metrics_handler_reports_stats() {
        let state = test_state();
        state
            .cache
            .set("k", json!(1), Duration::from_secs(60))
            .await
            .unwrap();

        let response = metrics_handler(State(state), HeaderMap::new()).await.unwrap();

        assert_eq!(response.cache_status, CacheStatus::Bypass);
        assert_eq!(response.body["stats"]["size"], 1);
        assert_eq!(response.body["utilization"], "0.10%");
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();
        state
            .cache
            .set("k", json!(1), Duration::from_secs(60))
            .await
            .unwrap();

        let response = clear_handler(State(state.clone())).await.unwrap();

        assert_eq!(response.message, "Cache cleared successfully");
        assert!(state.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_state_rejects_invalid_config() {
        let config = Config {
            metrics_rate_limit: 0,
            ..Config::default()
        };
        assert!(AppState::from_config(&config).is_err());
    }
}
