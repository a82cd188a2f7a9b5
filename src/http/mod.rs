//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → access log guard started
//!     → endpoints (health / read / work)
//!     → error.rs (AppError → status + body)
//!     → access log guard finished → record emitted
//!     → Send to client
//! ```

pub mod error;
pub mod server;

pub use error::AppError;
pub use server::{AppState, LabServer};
