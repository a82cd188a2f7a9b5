//! Per-request records on standard output.
//!
//! Every request that reaches the router produces exactly one JSON line:
//!
//! ```text
//! {"ts_ms":1718000000000,"node_id":"node-a","method":"GET","path":"/work","query":"ms=5","status":200,"latency_ms":5.213}
//! ```
//!
//! # Design Decisions
//! - The record is owned by a drop guard, so it is emitted on every exit
//!   path: normal return, handler panic, or the request future being dropped
//! - Until a status is known the guard reports 500
//! - Records go to stdout unbuffered, in completion order; diagnostics stay on
//!   stderr so a collector can parse stdout line by line

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::observability::metrics;

/// One finished request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub ts_ms: u64,
    pub node_id: String,
    pub method: String,
    pub path: String,
    pub query: String,
    pub status: u16,
    pub latency_ms: f64,
}

/// Destination for finished records.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: &RequestRecord);
}

/// Writes each record as one JSON line to `W`, flushing after every record.
#[derive(Debug)]
pub struct WriterSink<W> {
    out: Mutex<W>,
}

/// The production sink.
pub type StdoutSink = WriterSink<std::io::Stdout>;

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> RecordSink for WriterSink<W> {
    fn emit(&self, record: &RequestRecord) {
        let mut line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize request record");
                return;
            }
        };
        line.push('\n');

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = out.write_all(line.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write request record");
        }
    }
}

/// Keeps records in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<RequestRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<RequestRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &RequestRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Shared state for the logging middleware.
#[derive(Clone)]
pub struct AccessLog {
    node_id: Arc<str>,
    sink: Arc<dyn RecordSink>,
}

impl AccessLog {
    pub fn new(node_id: impl Into<Arc<str>>, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            node_id: node_id.into(),
            sink,
        }
    }
}

/// Drop guard for an in-flight request.
///
/// Emits its record exactly once, when dropped.
pub struct RecordGuard {
    log: AccessLog,
    ts_ms: u64,
    started: Instant,
    method: String,
    path: String,
    query: String,
    route: Option<String>,
    status: Option<StatusCode>,
}

impl RecordGuard {
    /// Start timing a request.
    pub fn start(log: &AccessLog, req: &Request) -> Self {
        Self {
            log: log.clone(),
            ts_ms: epoch_millis(),
            started: Instant::now(),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().unwrap_or_default().to_string(),
            route: req
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string()),
            status: None,
        }
    }

    /// Record the status the client will see.
    pub fn finish(mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        let status = self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR).as_u16();

        let record = RequestRecord {
            ts_ms: self.ts_ms,
            node_id: self.log.node_id.to_string(),
            method: std::mem::take(&mut self.method),
            path: std::mem::take(&mut self.path),
            query: std::mem::take(&mut self.query),
            status,
            latency_ms: round_millis(elapsed.as_secs_f64() * 1_000.0),
        };

        metrics::record_request(
            &record.method,
            self.route.as_deref().unwrap_or("unmatched"),
            status,
            elapsed,
        );

        tracing::debug!(
            method = %record.method,
            path = %record.path,
            status,
            latency_ms = record.latency_ms,
            "Request completed"
        );

        self.log.sink.emit(&record);
    }
}

/// Middleware wrapping every request in a [`RecordGuard`].
pub async fn log_requests(State(log): State<AccessLog>, req: Request, next: Next) -> Response {
    let guard = RecordGuard::start(&log, &req);
    let response = next.run(req).await;
    guard.finish(response.status());
    response
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Round to three decimal places.
fn round_millis(ms: f64) -> f64 {
    (ms * 1_000.0).round() / 1_000.0
}
