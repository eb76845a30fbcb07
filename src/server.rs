//!
//! iot-portal gateway
//! ------------------
//! Axum-based forwarding layer between the portal client and the upstream device API.
//! The browser never holds backend credentials; it calls `/api/{operation}` here and the
//! gateway relays the call, with the caller's Authorization header, to the upstream.
//!
//! Responsibilities:
//! - Allow-list check on the operation path segment (the trust boundary).
//! - Per-operation upstream method, path and query shape.
//! - Identity pass-through: the inbound Authorization header is forwarded verbatim.
//! - Normalizing transport/decode failures to `{ "error": ... }` with status 500.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::{any, get}, Router};
use tracing::info;

use crate::config::GatewayConfig;

pub mod proxy;
pub mod upstream;

use upstream::{HttpUpstream, UpstreamClient};

/// Shared state injected into all handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: Arc<dyn UpstreamClient>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_upstream(config, Arc::new(HttpUpstream::new(client))))
    }

    pub fn with_upstream(config: GatewayConfig, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { config: Arc::new(config), upstream }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "iot-portal gateway ok" }))
        .route("/api/{operation}", any(proxy::proxy_handler))
        .with_state(state)
}

fn log_startup(config: &GatewayConfig) {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "startup",
        "iot-portal gateway starting: RUST_LOG='{}', bind={}, upstream={}, stage='{}'",
        rust_log, config.bind_addr, config.upstream_base_url, config.stage
    );
}

/// Start the gateway on the configured address and serve until the listener fails.
pub async fn run_with_config(config: GatewayConfig) -> anyhow::Result<()> {
    log_startup(&config);
    let addr: SocketAddr = config.bind_addr;
    let app = build_router(AppState::new(config)?);
    info!("Starting gateway on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Convenience entry point configured entirely from the environment.
pub async fn run() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;
    run_with_config(config).await
}
