//! Liveness probe.

/// `GET /health`. Query parameters are ignored.
pub async fn health() -> &'static str {
    "ok"
}
