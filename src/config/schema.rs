//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the lab node.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Smallest byte count `/read` accepts.
pub const READ_BYTES_MIN: u64 = 1;

/// Largest byte count `/read` accepts.
pub const READ_BYTES_MAX: u64 = 5_000_000;

/// Root configuration for a lab node.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LabConfig {
    /// Node identity and endpoint defaults.
    pub node: NodeConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Tokio runtime sizing.
    pub runtime: RuntimeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node identity and per-endpoint defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Tag attached to every response and request record.
    pub node_id: String,

    /// Byte count `/read` uses when `n` is omitted.
    pub read_bytes_default: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: "node-local".to_string(),
            read_bytes_default: 65_536,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Runtime sizing.
///
/// Spinning and hashing run on the blocking pool, so `max_blocking_threads`
/// bounds how many CPU-bound requests can be in flight at once.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Async worker threads (None = number of CPUs).
    pub worker_threads: Option<usize>,

    /// Upper bound on threads in the blocking pool.
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_blocking_threads: 512,
        }
    }
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default diagnostic log level; `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Diagnostic log format (stderr).
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LabConfig::default();
        assert_eq!(config.node.node_id, "node-local");
        assert_eq!(config.node.read_bytes_default, 65_536);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LabConfig = toml::from_str(
            r#"
            [node]
            node_id = "edge-3"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.node.node_id, "edge-3");
        assert_eq!(config.node.read_bytes_default, 65_536);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.runtime.max_blocking_threads, 512);
    }
}
