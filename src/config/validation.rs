//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Returns all errors,
//! not just the first, so a broken config can be fixed in one pass.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.host must not be empty")]
    EmptyUpstreamHost,

    #[error("upstream origin '{0}' is not a valid URL")]
    UpstreamOrigin(String),

    #[error("upstream.port must not be zero")]
    ZeroUpstreamPort,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.host.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstreamHost);
    } else if Url::parse(&config.upstream.origin()).is_err() {
        errors.push(ValidationError::UpstreamOrigin(config.upstream.origin()));
    }

    if config.upstream.port == 0 {
        errors.push(ValidationError::ZeroUpstreamPort);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
