//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment-variable overrides on top of a loaded config.
///
/// Honors the variables the front-end deployment already uses:
/// - `PORT`: gateway listen port (bind host is kept)
/// - `BACKEND_HOST`: upstream host
/// - `BACKEND_PORT`: upstream port
///
/// Unparseable values are logged and ignored; validation runs again
/// afterwards in `main`.
pub fn apply_env_overrides(mut config: GatewayConfig) -> GatewayConfig {
    if let Ok(port) = std::env::var("PORT") {
        match port.parse::<u16>() {
            Ok(port) => {
                let host = config
                    .listener
                    .bind_address
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                config.listener.bind_address = format!("{}:{}", host, port);
            }
            Err(_) => tracing::warn!(value = %port, "Ignoring unparseable PORT override"),
        }
    }

    if let Ok(host) = std::env::var("BACKEND_HOST") {
        if !host.is_empty() {
            config.upstream.host = host;
        }
    }

    if let Ok(port) = std::env::var("BACKEND_PORT") {
        match port.parse::<u16>() {
            Ok(port) => config.upstream.port = port,
            Err(_) => tracing::warn!(value = %port, "Ignoring unparseable BACKEND_PORT override"),
        }
    }

    config
}
