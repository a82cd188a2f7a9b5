//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (read default within the `/read` bounds)
//! - Check that addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LabConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{LabConfig, READ_BYTES_MAX, READ_BYTES_MIN};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &LabConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.node.node_id.trim().is_empty() {
        errors.push(ValidationError::new("node.node_id", "must not be empty"));
    }

    let default = config.node.read_bytes_default;
    if !(READ_BYTES_MIN..=READ_BYTES_MAX).contains(&default) {
        errors.push(ValidationError::new(
            "node.read_bytes_default",
            format!("{} is outside [{}, {}]", default, READ_BYTES_MIN, READ_BYTES_MAX),
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.runtime.max_blocking_threads == 0 {
        errors.push(ValidationError::new("runtime.max_blocking_threads", "must be > 0"));
    }

    if config.runtime.worker_threads == Some(0) {
        errors.push(ValidationError::new("runtime.worker_threads", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LabConfig::default()).is_ok());
    }

    #[test]
    fn test_read_default_bounds() {
        let mut config = LabConfig::default();
        config.node.read_bytes_default = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "node.read_bytes_default");

        config.node.read_bytes_default = READ_BYTES_MAX + 1;
        assert!(validate_config(&config).is_err());

        config.node.read_bytes_default = READ_BYTES_MAX;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = LabConfig::default();
        config.node.node_id = "  ".into();
        config.listener.bind_address = "not-an-addr".into();
        config.runtime.max_blocking_threads = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = LabConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
