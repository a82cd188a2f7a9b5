//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → access_log.rs (one JSON record on stdout)
//!     → metrics.rs (counters, histograms)
//!
//! Process diagnostics:
//!     → logging.rs (tracing on stderr)
//! ```
//!
//! # Design Decisions
//! - Request records and diagnostics use separate streams
//! - Metrics are cheap and optional

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::{
    AccessLog, MemorySink, RecordGuard, RecordSink, RequestRecord, StdoutSink,
    WriterSink,
};
