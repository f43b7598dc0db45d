//! Per-verb proxy handlers.
//!
//! # Responsibilities
//! - Build the outbound upstream request for each HTTP verb
//! - Normalize headers (Authorization pass-through, multipart preservation)
//! - Await the upstream call under the configured deadline
//! - Render the upstream response on the binary or JSON branch
//!
//! # Contract
//! - GET/DELETE forward only the caller's `Authorization` header
//! - POST streams multipart bodies through unaltered; everything else is
//!   re-sent as `application/json`
//! - PUT always takes the JSON path on both legs
//! - Upstream statuses and bodies are propagated verbatim; only a dead or
//!   hanging upstream produces a gateway-generated error body

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        request::Parts,
        uri::{PathAndQuery, Scheme},
        Method, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Json,
};
use hyper::body::Incoming;
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::http::classify::{self, classify, BodyKind};
use crate::http::headers;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

const FETCH_FAILED: &str = "Failed to fetch data from backend";
const SEND_FAILED: &str = "Failed to send data to backend";
const UPDATE_FAILED: &str = "Failed to update data in backend";
const DELETE_FAILED: &str = "Failed to delete data from backend";

/// `GET /api/*`: forward with `Authorization` only, no body.
///
/// Spreadsheet, Excel and PDF responses are relayed byte-for-byte; anything
/// else is decoded as JSON.
pub async fn proxy_get(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, _body) = request.into_parts();
    let upstream = match bare_request(&state, Method::GET, &parts) {
        Ok(request) => request,
        Err(err) => return build_failure(err, FETCH_FAILED),
    };
    dispatch(&state, upstream, request_id(&parts.headers), Some(classify::DOWNLOAD_MARKERS), FETCH_FAILED).await
}

/// `POST /api/*`: multipart bodies stream through unaltered, JSON bodies
/// are re-serialized with a forced `Content-Type: application/json`.
pub async fn proxy_post(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let upstream = if is_multipart(&parts) {
        passthrough_request(&state, &parts, body)
    } else {
        let value = match read_json_body(body).await {
            Ok(value) => value,
            Err(err) => return invalid_body(err),
        };
        json_request(&state, Method::POST, &parts, &value)
    };

    let upstream = match upstream {
        Ok(request) => request,
        Err(err) => return build_failure(err, SEND_FAILED),
    };
    dispatch(&state, upstream, request_id(&parts.headers), Some(classify::UPLOAD_MARKERS), SEND_FAILED).await
}

/// `PUT /api/*`: JSON body out, JSON response back. No binary branch.
pub async fn proxy_put(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let value = match read_json_body(body).await {
        Ok(value) => value,
        Err(err) => return invalid_body(err),
    };
    let upstream = match json_request(&state, Method::PUT, &parts, &value) {
        Ok(request) => request,
        Err(err) => return build_failure(err, UPDATE_FAILED),
    };
    dispatch(&state, upstream, request_id(&parts.headers), None, UPDATE_FAILED).await
}

/// `DELETE /api/*`: `Authorization` only, no body, JSON response.
pub async fn proxy_delete(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, _body) = request.into_parts();
    let upstream = match bare_request(&state, Method::DELETE, &parts) {
        Ok(request) => request,
        Err(err) => return build_failure(err, DELETE_FAILED),
    };
    dispatch(&state, upstream, request_id(&parts.headers), None, DELETE_FAILED).await
}

/// Send the prepared request upstream and translate the outcome into the
/// caller-facing response. Shared by all four verbs.
async fn dispatch(
    state: &AppState,
    request: Request<Body>,
    request_id: String,
    binary_markers: Option<&'static [&'static str]>,
    failure_message: &'static str,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    match send_upstream(state, request).await {
        Ok(upstream) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %upstream.status(),
                "Upstream responded"
            );
            let (response, branch) = render_response(upstream, binary_markers).await;
            metrics::record_request(&method, response.status().as_u16(), branch, started);
            response
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %err,
                "Upstream call failed"
            );
            let status = match err {
                GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            metrics::record_request(&method, status.as_u16(), "error", started);
            (status, Json(json!({ "error": failure_message }))).into_response()
        }
    }
}

/// One awaited network call, bounded by the upstream deadline. No retries.
async fn send_upstream(
    state: &AppState,
    request: Request<Body>,
) -> Result<hyper::Response<Incoming>, GatewayError> {
    let deadline = Duration::from_secs(state.timeouts.upstream_secs);
    match tokio::time::timeout(deadline, state.client.request(request)).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(err)) => Err(GatewayError::Upstream(err)),
        Err(_) => Err(GatewayError::UpstreamTimeout(deadline)),
    }
}

/// Buffer the upstream body and pick the response branch.
///
/// `binary_markers == None` means the verb has no binary branch (PUT and
/// DELETE); the body still falls back to a raw relay when it is not JSON.
async fn render_response(
    upstream: hyper::Response<Incoming>,
    binary_markers: Option<&[&str]>,
) -> (Response, &'static str) {
    let (parts, body) = upstream.into_parts();
    let bytes = match axum::body::to_bytes(Body::new(body), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Upstream body read failed mid-stream");
            let response = (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Upstream response body could not be read" })),
            );
            return (response.into_response(), "error");
        }
    };

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    if let Some(markers) = binary_markers {
        if classify(content_type, markers) == BodyKind::Binary {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = parts.status;
            headers::copy_present(
                &parts.headers,
                response.headers_mut(),
                headers::BINARY_RESPONSE_HEADERS,
            );
            return (response, "binary");
        }
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => ((parts.status, Json(value)).into_response(), "json"),
        Err(_) => {
            // Not JSON after all. Relay the raw payload rather than failing.
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = parts.status;
            if let Some(value) = parts.headers.get(header::CONTENT_TYPE) {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, value.clone());
            }
            (response, "raw")
        }
    }
}

/// Rebase the inbound URI onto the upstream origin, path and query unchanged.
fn upstream_uri(state: &AppState, uri: &Uri) -> Result<Uri, GatewayError> {
    let mut parts = uri.clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(state.authority.clone());
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = Uri::from_parts(parts).map_err(axum::http::Error::from)?;
    Ok(uri)
}

/// Request carrying only the `Authorization` header and no body (GET, DELETE).
fn bare_request(state: &AppState, method: Method, parts: &Parts) -> Result<Request<Body>, GatewayError> {
    let uri = upstream_uri(state, &parts.uri)?;
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = headers::authorization(&parts.headers) {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    Ok(builder.body(Body::empty())?)
}

/// Request with a re-serialized JSON body and forced JSON content type.
fn json_request(
    state: &AppState,
    method: Method,
    parts: &Parts,
    value: &Value,
) -> Result<Request<Body>, GatewayError> {
    let uri = upstream_uri(state, &parts.uri)?;
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = headers::authorization(&parts.headers) {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = serde_json::to_vec(value).map_err(GatewayError::InvalidJsonBody)?;
    Ok(builder.body(Body::from(body))?)
}

/// Multipart pass-through: the inbound body streams upstream untouched and
/// every inbound header except `host`/`content-length` goes with it, so the
/// boundary parameter survives.
fn passthrough_request(state: &AppState, parts: &Parts, body: Body) -> Result<Request<Body>, GatewayError> {
    let uri = upstream_uri(state, &parts.uri)?;
    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .body(body)?;
    *request.headers_mut() = headers::stripped(&parts.headers, headers::STRIPPED_REQUEST_HEADERS);
    Ok(request)
}

fn is_multipart(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("multipart/form-data"))
        .unwrap_or(false)
}

/// Buffer and parse a JSON request body. An empty body counts as `{}`,
/// matching what the admin pages actually send for bodyless mutations.
async fn read_json_body(body: Body) -> Result<Value, GatewayError> {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(GatewayError::Body)?;
    if bytes.is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_slice(&bytes).map_err(GatewayError::InvalidJsonBody)
}

fn invalid_body(err: GatewayError) -> Response {
    tracing::warn!(error = %err, "Rejecting request body");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Request body is not valid JSON" })),
    )
        .into_response()
}

fn build_failure(err: GatewayError, failure_message: &'static str) -> Response {
    tracing::error!(error = %err, "Failed to build upstream request");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": failure_message })),
    )
        .into_response()
}
