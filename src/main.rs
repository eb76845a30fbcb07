use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let api_url = std::env::var(iot_portal::config::ENV_API_URL).unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "iot_portal", "iot-portal starting: upstream='{}'", api_url);

    iot_portal::server::run().await
}
