//! Synthetic load endpoint library.

pub mod config;
pub mod endpoints;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::LabConfig;
pub use http::LabServer;
pub use lifecycle::Shutdown;
