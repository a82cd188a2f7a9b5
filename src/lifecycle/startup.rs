//! Startup orchestration.
//!
//! # Responsibilities
//! - Size the Tokio runtime from configuration
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, once everything else is ready

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::runtime::{Builder, Runtime};

use crate::config::{LabConfig, RuntimeConfig};
use crate::http::LabServer;
use crate::lifecycle::Shutdown;
use crate::observability::{metrics, StdoutSink};

/// Build the multi-threaded runtime.
///
/// The blocking pool hosts every spin and hash, so its size is the number of
/// CPU-bound requests the node serves concurrently.
pub fn build_runtime(config: &RuntimeConfig) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder
        .enable_all()
        .thread_name("qos-lab-worker")
        .max_blocking_threads(config.max_blocking_threads);

    if let Some(workers) = config.worker_threads {
        builder.worker_threads(workers);
    }

    builder.build()
}

/// Serve `config` until SIGINT/SIGTERM.
pub async fn serve(config: LabConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let _signal_task = shutdown.trigger_on_signal();

    let server = LabServer::new(config, Arc::new(StdoutSink::stdout()));
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
