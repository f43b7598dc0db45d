//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the four per-verb proxy routes
//! - Wire up middleware (tracing, timeout, request ID)
//! - Disable the default body-size cap (file uploads pass through here)
//! - Bind server to listener and serve until shutdown

use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::uri::Authority,
    routing::get,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{GatewayConfig, TimeoutConfig};
use crate::error::GatewayError;
use crate::http::forward::{proxy_delete, proxy_get, proxy_post, proxy_put};
use crate::http::request::RequestIdLayer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared upstream HTTP client.
    pub client: Client<HttpConnector, Body>,
    /// Upstream authority ("host:port") for outbound URIs.
    pub authority: Authority,
    /// Timeout settings for the upstream leg.
    pub timeouts: TimeoutConfig,
}

/// HTTP server for the API gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let authority = Authority::from_str(&config.upstream.authority())
            .map_err(|_| GatewayError::BadOrigin(config.upstream.origin()))?;

        let state = AppState {
            client,
            authority,
            timeouts: config.timeouts.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let api = get(proxy_get)
            .post(proxy_post)
            .put(proxy_put)
            .delete(proxy_delete);

        Router::new()
            .route("/api", api.clone())
            .route("/api/{*path}", api)
            .layer(DefaultBodyLimit::disable())
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
