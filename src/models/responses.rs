//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::{format_percent, CacheStats};

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Response body for `GET /cache/metrics`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub stats: CacheStats,
    /// Hit rate as `"NN.NN%"`
    pub hit_rate: String,
    /// size / maxSize as `"NN.NN%"`
    pub utilization: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl MetricsResponse {
    /// Builds the metrics body from a stats snapshot
    pub fn from_stats(stats: CacheStats) -> Self {
        Self {
            hit_rate: format_percent(stats.hit_rate()),
            utilization: format_percent(stats.utilization()),
            stats,
            timestamp: now_rfc3339(),
        }
    }
}

/// Response body for `POST /cache/clear`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
    pub timestamp: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
            timestamp: now_rfc3339(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error summary
    pub error: String,
    /// Optional one-line detail, never a backtrace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_response_format() {
        let mut stats = CacheStats::new(200);
        stats.hits = 3;
        stats.misses = 1;
        stats.size = 50;

        let json = serde_json::to_value(MetricsResponse::from_stats(stats)).unwrap();
        assert_eq!(json["hitRate"], "75.00%");
        assert_eq!(json["utilization"], "25.00%");
        assert_eq!(json["stats"]["maxSize"], 200);
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_clear_response_message() {
        let resp = ClearResponse::cleared();
        assert_eq!(resp.message, "Cache cleared successfully");
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse {
            error: "Something went wrong".to_string(),
            details: None,
        })
        .unwrap();
        assert_eq!(json["error"], "Something went wrong");
        assert!(json.get("details").is_none());

        let json = serde_json::to_value(ErrorResponse::with_details("Failed", "disk")).unwrap();
        assert_eq!(json["details"], "disk");
    }
}
