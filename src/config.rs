//! Configuration Module
//!
//! Handles loading and validating service configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{CacheError, Result};

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds for cached API responses
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Requests per window allowed on `GET /cache/metrics`
    pub metrics_rate_limit: u32,
    /// Requests per window allowed on cached API endpoints
    pub api_rate_limit: u32,
    /// Rate limit window in seconds
    pub rate_limit_window: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Response TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `METRICS_RATE_LIMIT` - Metrics requests per window (default: 10)
    /// - `API_RATE_LIMIT` - API requests per window (default: 100)
    /// - `RATE_LIMIT_WINDOW` - Window length in seconds (default: 60)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            metrics_rate_limit: env_or("METRICS_RATE_LIMIT", defaults.metrics_rate_limit),
            api_rate_limit: env_or("API_RATE_LIMIT", defaults.api_rate_limit),
            rate_limit_window: env_or("RATE_LIMIT_WINDOW", defaults.rate_limit_window),
        }
    }

    /// Rejects settings the cache and rate limiter cannot work with.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.max_entries == 0, "MAX_ENTRIES must be positive"),
            (self.default_ttl == 0, "DEFAULT_TTL must be positive"),
            (self.cleanup_interval == 0, "CLEANUP_INTERVAL must be positive"),
            (self.metrics_rate_limit == 0, "METRICS_RATE_LIMIT must be positive"),
            (self.api_rate_limit == 0, "API_RATE_LIMIT must be positive"),
            (self.rate_limit_window == 0, "RATE_LIMIT_WINDOW must be positive"),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, msg)) => Err(CacheError::InvalidArgument(msg.to_string())),
            None => Ok(()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            server_port: 3000,
            cleanup_interval: 1,
            metrics_rate_limit: 10,
            api_rate_limit: 100,
            rate_limit_window: 60,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
