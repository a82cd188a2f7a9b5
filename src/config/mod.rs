//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (LabConfig::default)
//!     → optional TOML file (--config)
//!     → environment (NODE_ID, READ_BYTES_DEFAULT, BIND_ADDRESS)
//!     → validation.rs (semantic checks)
//!     → LabConfig (validated, immutable)
//!     → shared via Arc with the handlers
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with, ConfigError};
pub use schema::{LabConfig, ListenerConfig, LogFormat, NodeConfig, ObservabilityConfig, RuntimeConfig};
pub use schema::{READ_BYTES_MAX, READ_BYTES_MIN};
