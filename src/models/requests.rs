//! Request DTOs for the cache service API
//!
//! Defines the query parameters accepted by the cached endpoints.

use serde::Deserialize;

/// Default page size for voiceover listings
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size a caller may request
pub const MAX_LIMIT: u32 = 100;

/// Query string for `GET /api/voiceovers`
///
/// # Fields
/// - `group`: Optional talent group filter (case-insensitive)
/// - `limit`: Optional page size, 1..=100
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceoverQuery {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl VoiceoverQuery {
    /// Validates the query.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_LIMIT {
                return Some(format!("limit must be between 1 and {}", MAX_LIMIT));
            }
        }
        if self.group.as_deref().is_some_and(|g| g.trim().is_empty()) {
            return Some("group cannot be empty".to_string());
        }
        None
    }

    /// Page size with the default applied.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT) as usize
    }
}
