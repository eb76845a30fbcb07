//!
//! iot-portal gateway binary
//! -------------------------
//! Command-line entry point for the forwarding gateway. Configuration comes from
//! environment variables; CLI flags override them.

use std::env;

use anyhow::{Context, Result};
use iot_portal::config::{self, GatewayConfig};

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("iot-portal gateway\n\nUSAGE:\n  portal_gateway [--api-url URL] [--stage NAME] [--http-port N]\n\nOPTIONS:\n  --api-url URL    Upstream API base URL (env: {api}, required)\n  --stage NAME     Upstream stage path segment (env: {stage}, default {dstage}); pass \"\" for none\n  --http-port N    Gateway HTTP port (env: {port}, default {dport})\n",
            api = config::ENV_API_URL, stage = config::ENV_API_STAGE, dstage = config::DEFAULT_STAGE,
            port = config::ENV_HTTP_PORT, dport = config::DEFAULT_HTTP_PORT);
        return Ok(());
    }

    // CLI arguments override environment
    let api_url = arg_value(&args, "--api-url")
        .or_else(|| env::var(config::ENV_API_URL).ok())
        .filter(|s| !s.trim().is_empty())
        .with_context(|| format!("{} (or --api-url) must be set", config::ENV_API_URL))?;
    let stage = arg_value(&args, "--stage")
        .or_else(|| env::var(config::ENV_API_STAGE).ok())
        .unwrap_or_else(|| config::DEFAULT_STAGE.to_string());
    let http_port = match arg_value(&args, "--http-port") {
        Some(p) => p.parse::<u16>().with_context(|| format!("invalid --http-port: {}", p))?,
        None => config::http_port(env::var(config::ENV_HTTP_PORT).ok())?,
    };

    let cfg = GatewayConfig::new(&api_url, &stage, http_port).context("invalid gateway configuration")?;
    println!("iot-portal gateway starting: http={}, upstream={}, stage='{}'", http_port, cfg.upstream_base_url, cfg.stage);
    tracing::info!("Using port: http={}, upstream={}", http_port, cfg.upstream_base_url);
    iot_portal::server::run_with_config(cfg).await
}
