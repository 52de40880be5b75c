//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cleanup: Removes expired cache entries and stale rate limit windows

mod cleanup;

pub use cleanup::spawn_cleanup_task;
