//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (/api/...)
//!     → server.rs (Axum setup, middleware, per-verb routes)
//!     → request.rs (inject x-request-id)
//!     → forward.rs (build upstream request, dispatch, render response)
//!     → headers.rs (strip/copy header bags)
//!     → classify.rs (binary vs JSON response branch)
//!     → Send to client
//! ```

pub mod classify;
pub mod forward;
pub mod headers;
pub mod request;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::GatewayServer;
