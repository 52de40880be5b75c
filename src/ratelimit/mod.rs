//! Rate Limiting Module
//!
//! Per-caller request quotas checked before any cache access.

mod limiter;

pub use limiter::{RateLimitConfig, RateLimiter};

use axum::http::HeaderMap;

/// Caller identity used when nothing better is available.
pub const ANONYMOUS_CALLER: &str = "anonymous";

/// Identifies the caller from proxy headers.
///
/// Uses the first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// [`ANONYMOUS_CALLER`].
///
/// Both headers are taken at face value. The service must run behind a
/// reverse proxy that overwrites them; exposed directly, a client can pick
/// a fresh identity per request and never hit its quota.
pub fn caller_id(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(ANONYMOUS_CALLER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_caller_id_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 172.16.0.9"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));

        assert_eq!(caller_id(&headers), "10.0.0.1");
    }

    #[test]
    fn test_caller_id_falls_back() {
        let mut headers = HeaderMap::new();
        assert_eq!(caller_id(&headers), ANONYMOUS_CALLER);

        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));
        assert_eq!(caller_id(&headers), "192.168.1.1");
    }
}
