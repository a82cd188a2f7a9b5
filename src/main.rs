//! qos-lab-api
//!
//! A synthetic backend for load-balancer, autoscaler and traffic-shaping
//! experiments. Each node serves three endpoints with controllable cost:
//!
//! ```text
//!     Client / Load balancer
//!             │
//!             ▼
//!   ┌───────────────────────────────────────────────┐
//!   │                 QOS LAB NODE                   │
//!   │                                                │
//!   │  ┌────────────┐   ┌─────────────────────────┐  │
//!   │  │ access log │──▶│ /health  liveness       │  │
//!   │  │  (stdout)  │   │ /read    random + sha256│  │
//!   │  │            │   │ /work    spin + failures│  │
//!   │  └────────────┘   └───────────┬─────────────┘  │
//!   │                               │                │
//!   │                     blocking thread pool       │
//!   │                                                │
//!   │  config (file + env) · tracing (stderr)        │
//!   │  metrics (optional) · graceful shutdown        │
//!   └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use qos_lab_api::config::{load_config, validation::validate_config, ConfigError};
use qos_lab_api::lifecycle::startup::{build_runtime, serve};
use qos_lab_api::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "qos-lab-api")]
#[command(about = "Synthetic latency, CPU and failure endpoint for load experiments", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability)?;

    tracing::info!("qos-lab-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        node_id = %config.node.node_id,
        bind_address = %config.listener.bind_address,
        read_bytes_default = config.node.read_bytes_default,
        max_blocking_threads = config.runtime.max_blocking_threads,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let runtime = build_runtime(&config.runtime)?;
    runtime.block_on(serve(config))?;

    tracing::info!("Shutdown complete");
    Ok(())
}
