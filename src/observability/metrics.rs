//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lab_requests_total` (counter): requests by method, path, status
//! - `lab_request_duration_seconds` (histogram): latency by method, path
//! - `lab_injected_failures_total` (counter): failures produced by `/work`
//!
//! # Design Decisions
//! - Exporter is optional; without it the macros record into a no-op recorder
//! - The `path` label is the matched route template (`unmatched` otherwise),
//!   never the raw request path

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

pub fn record_request(method: &str, path: &str, status: u16, latency: Duration) {
    metrics::counter!(
        "lab_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "lab_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency.as_secs_f64());
}

pub fn record_injected_failure() {
    metrics::counter!("lab_injected_failures_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metrics_carry_path_label() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_request("GET", "/work", 200, Duration::from_millis(3));
            record_injected_failure();
        });

        let rendered = handle.render();
        assert!(rendered.contains("lab_requests_total"), "{}", rendered);
        assert!(rendered.contains(r#"path="/work""#), "{}", rendered);
        assert!(rendered.contains(r#"status="200""#), "{}", rendered);
        assert!(!rendered.contains("route="), "{}", rendered);
        assert!(rendered.contains("lab_injected_failures_total 1"), "{}", rendered);
    }
}
