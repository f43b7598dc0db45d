//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use api_gateway::{GatewayConfig, GatewayServer, Shutdown};

/// One request observed by a mock backend.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Start a mock upstream that answers every request with a fixed response
/// and records what it received.
pub async fn start_mock_backend(
    status: StatusCode,
    headers: Vec<(&'static str, &'static str)>,
    body: Vec<u8>,
) -> (SocketAddr, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let recorder = recorder.clone();
        let headers = headers.clone();
        let body = body.clone();
        async move {
            let (parts, inbound) = request.into_parts();
            let bytes = axum::body::to_bytes(inbound, usize::MAX).await.unwrap();
            recorder.lock().unwrap().push(SeenRequest {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body: bytes.to_vec(),
            });

            let mut response = Response::builder().status(status);
            for (name, value) in &headers {
                response = response.header(*name, *value);
            }
            response.body(Body::from(body)).unwrap()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, seen)
}

/// Start a mock upstream that never answers within a sane deadline.
#[allow(dead_code)]
pub async fn start_hanging_backend() -> SocketAddr {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        StatusCode::OK
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Start the gateway in-process, pointed at `upstream`.
///
/// Returns the gateway address and the shutdown handle; dropping the handle
/// stops the server, so tests hold on to it.
pub async fn start_gateway(upstream: SocketAddr) -> (SocketAddr, Shutdown) {
    let mut config = GatewayConfig::default();
    config.upstream.host = upstream.ip().to_string();
    config.upstream.port = upstream.port();
    config.timeouts.upstream_secs = 2;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = GatewayServer::new(config).unwrap();
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    (addr, shutdown)
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A reqwest client that ignores any ambient proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
