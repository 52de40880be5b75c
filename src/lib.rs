//! 14voices response cache
//!
//! In-memory response cache for the site API layer, with per-caller rate
//! limiting and operational endpoints for cache metrics and clearing.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::CacheError;
pub use tasks::spawn_cleanup_task;
