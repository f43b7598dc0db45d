//! Error types for the proxy path.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while forwarding a single request upstream.
///
/// Every variant is translated into an HTTP response by the handlers;
/// nothing here escapes past a request/response cycle.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream connection failed (refused, reset, DNS, ...).
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The upstream did not answer within the configured deadline.
    #[error("upstream timed out after {0:?}")]
    UpstreamTimeout(Duration),

    /// Reading the upstream response body failed mid-stream.
    #[error("failed to read upstream body: {0}")]
    Body(#[source] axum::Error),

    /// The inbound request body was declared JSON but does not parse.
    #[error("request body is not valid JSON: {0}")]
    InvalidJsonBody(#[source] serde_json::Error),

    /// The forwarded request could not be constructed.
    #[error("failed to build upstream request: {0}")]
    BadRequest(#[from] axum::http::Error),

    /// The configured upstream authority does not form a valid URI.
    #[error("invalid upstream origin: {0}")]
    BadOrigin(String),
}
