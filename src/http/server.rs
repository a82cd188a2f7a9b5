//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request records, panic recovery, tracing)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::sync::Arc;

use axum::{http::StatusCode, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::LabConfig;
use crate::endpoints;
use crate::observability::access_log::{log_requests, AccessLog, RecordSink};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LabConfig>,
}

/// HTTP server for a lab node.
pub struct LabServer {
    router: Router,
    config: Arc<LabConfig>,
}

impl LabServer {
    /// Create a new server; finished request records go to `sink`.
    pub fn new(config: LabConfig, sink: Arc<dyn RecordSink>) -> Self {
        let config = Arc::new(config);
        let access_log = AccessLog::new(config.node.node_id.as_str(), sink);
        let state = AppState {
            config: config.clone(),
        };

        let router = Self::build_router(state, access_log);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The request logger is the outermost layer so it observes the status
    /// produced by panic recovery.
    fn build_router(state: AppState, access_log: AccessLog) -> Router {
        let routes = Router::new()
            .route("/health", get(endpoints::health))
            .route("/read", get(endpoints::read))
            .route("/work", get(endpoints::work));

        with_middleware(routes, state, access_log)
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            node_id = %self.config.node.node_id,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &LabConfig {
        &self.config
    }
}

fn with_middleware(routes: Router<AppState>, state: AppState, access_log: AccessLog) -> Router {
    routes
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(access_log, log_requests))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MemorySink;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_panicking_handler_is_logged_once_as_500() {
        let sink = Arc::new(MemorySink::new());
        let state = AppState {
            config: Arc::new(LabConfig::default()),
        };
        let app = with_middleware(
            Router::new().route("/explode", get(explode)),
            state,
            AccessLog::new("node-p", sink.clone()),
        );

        let response = app
            .oneshot(Request::get("/explode?x=1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, 500);
        assert_eq!(records[0].path, "/explode");
        assert_eq!(records[0].query, "x=1");
    }
}
