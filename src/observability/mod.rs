//! Observability subsystem.
//!
//! Logging is initialized in `main` via `tracing-subscriber`; this module
//! carries the metrics side. Both are diagnostic only and not part of the
//! proxy contract.

pub mod metrics;
