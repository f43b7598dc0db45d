//! API Gateway for a school-management admin front end.
//!
//! Forwards `GET|POST|PUT|DELETE /api/*` to the backend REST service,
//! normalizing headers and body encoding in each direction and branching
//! response handling between file downloads and JSON.
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                API GATEWAY                    │
//!   Browser request   │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ──────────────────┼─▶│  http   │──▶│ forward  │──▶│  hyper    │──┼──▶ Backend
//!                     │  │ server  │   │ handlers │   │  client   │  │    REST API
//!                     │  └─────────┘   └────┬─────┘   └───────────┘  │
//!                     │                     │                        │
//!   Browser response  │  ┌─────────┐   ┌────▼─────┐                  │
//!   ◀─────────────────┼──│ classify│◀──│ headers  │                  │
//!                     │  │ bin/json│   │ strip    │                  │
//!                     │  └─────────┘   └──────────┘                  │
//!                     │  config · observability · lifecycle          │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_gateway::config::{apply_env_overrides, load_config, validate_config, GatewayConfig};
use api_gateway::{GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Reverse-proxy gateway for the school-management backend", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    let config = apply_env_overrides(config);
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        return Err("configuration validation failed".into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => api_gateway::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    let server = GatewayServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
