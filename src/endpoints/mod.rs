//! Synthetic endpoints served by a lab node.
//!
//! # Data Flow
//! ```text
//! GET /health → health.rs (liveness, always "ok")
//! GET /read   → read.rs   (random bytes → SHA-256, on the blocking pool)
//! GET /work   → work.rs   (failure draw → jitter → spin, on the blocking pool)
//! ```
//!
//! # Design Decisions
//! - Query parameters are validated before any work or random draw happens
//! - CPU-bound work never runs on async worker threads
//! - Handlers hold no state beyond the immutable node configuration

pub mod health;
pub mod read;
pub mod work;

use axum::extract::{rejection::QueryRejection, Query};

use crate::http::AppError;

pub use health::health;
pub use read::read;
pub use work::work;

/// Unwrap a query extraction, turning undecodable input into a 422.
///
/// Repeated keys (`?ms=1&ms=2`) are rejected here too rather than picking one.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::MalformedQuery(rejection.body_text()))
}
