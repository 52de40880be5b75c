//! API Module
//!
//! HTTP handlers, routing and the cached endpoint wrapper.
//!
//! # Endpoints
//! - `GET /cache/metrics` - Cache statistics
//! - `POST /cache/clear` - Clear the cache
//! - `GET /api/voiceovers` - Cached voiceover listing
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
pub mod wrapper;

pub use handlers::*;
pub use routes::create_router;
pub use wrapper::{
    CachePolicy, CacheStatus, CachedEndpoint, EndpointConfig, RequestIdentity, WrappedResponse,
    CACHE_STATUS_HEADER,
};
