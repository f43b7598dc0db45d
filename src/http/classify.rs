//! Response body classification.
//!
//! The backend answers either with JSON or with generated files
//! (spreadsheet exports, PDF reports). The split is decided purely by
//! substring markers in the response `Content-Type`, so the policy is
//! independent of the transport library.

/// How a response body should be relayed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Forward the bytes untouched, copying file-framing headers.
    Binary,
    /// Decode as UTF-8 JSON and re-serialize.
    Json,
}

/// Content-Type markers that make a GET response a file download.
pub const DOWNLOAD_MARKERS: &[&str] = &["spreadsheet", "excel", "pdf"];

/// Markers for POST responses; uploads may echo back raw octet streams.
pub const UPLOAD_MARKERS: &[&str] = &["spreadsheet", "excel", "pdf", "octet-stream"];

/// Classify a response `Content-Type` against a marker list.
///
/// A missing header is JSON: the backend never serves a file without
/// naming its type.
pub fn classify(content_type: Option<&str>, markers: &[&str]) -> BodyKind {
    match content_type {
        Some(value) if markers.iter().any(|m| value.contains(m)) => BodyKind::Binary,
        _ => BodyKind::Json,
    }
}
