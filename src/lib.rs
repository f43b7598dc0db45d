//! API Gateway Library
//!
//! A reverse-proxy gateway that fronts a school-management REST backend.
//! All `/api/*` traffic is forwarded verb-by-verb to a configured upstream
//! origin; responses come back either as JSON or as raw file downloads.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
