//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::LabConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the node identity.
pub const ENV_NODE_ID: &str = "NODE_ID";
/// Environment variable holding the default `/read` byte count.
pub const ENV_READ_BYTES_DEFAULT: &str = "READ_BYTES_DEFAULT";
/// Environment variable holding the listener bind address.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then an optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<LabConfig, ConfigError> {
    load_config_with(path, |var| std::env::var(var).ok())
}

/// [`load_config`] with the environment supplied by `lookup`.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<LabConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => LabConfig::default(),
    };

    let config = apply_env_overrides(config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so overrides can be tested without
/// mutating process state.
pub fn apply_env_overrides<F>(mut config: LabConfig, lookup: F) -> Result<LabConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(node_id) = lookup(ENV_NODE_ID) {
        config.node.node_id = node_id;
    }

    if let Some(raw) = lookup(ENV_READ_BYTES_DEFAULT) {
        config.node.read_bytes_default = raw.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_READ_BYTES_DEFAULT,
            value: raw.clone(),
        })?;
    }

    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    Ok(config)
}
