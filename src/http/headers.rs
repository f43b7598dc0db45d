//! Header-bag manipulation for forwarded requests and responses.
//!
//! # Design Decisions
//! - Exclusion lists are named constants, not inline filters
//! - `stripped` is a pure function over header maps
//! - Lookups are case-insensitive (`HeaderMap` normalizes names)

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Headers never copied onto an outbound upstream request.
///
/// `host` belongs to the gateway's own origin and `content-length` is
/// recomputed by the transport once the body is re-framed.
pub const STRIPPED_REQUEST_HEADERS: &[HeaderName] = &[header::HOST, header::CONTENT_LENGTH];

/// Headers copied back to the caller on the binary response branch.
pub const BINARY_RESPONSE_HEADERS: &[HeaderName] = &[
    header::CONTENT_TYPE,
    header::CONTENT_DISPOSITION,
    header::CONTENT_LENGTH,
];

/// Copy a header map, leaving out every name in `excluded`.
///
/// Repeated values (e.g. multiple `set-cookie`) are preserved in order.
pub fn stripped(headers: &HeaderMap, excluded: &[HeaderName]) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if excluded.iter().any(|e| e == name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// The caller's `Authorization` value, if any.
///
/// `HeaderMap` keys are case-insensitive, so this finds `Authorization`
/// and `authorization` alike. The value is returned byte-for-byte.
pub fn authorization(headers: &HeaderMap) -> Option<HeaderValue> {
    headers.get(header::AUTHORIZATION).cloned()
}

/// Copy the named headers from `from` into `to` when present.
pub fn copy_present(from: &HeaderMap, to: &mut HeaderMap, names: &[HeaderName]) {
    for name in names {
        if let Some(value) = from.get(name) {
            to.insert(name.clone(), value.clone());
        }
    }
}
