//! Gateway and client configuration sourced from environment variables, validated once at
//! startup so a missing upstream base fails before any route is served.

use std::net::SocketAddr;

use reqwest::Url;
use thiserror::Error;

pub const ENV_API_URL: &str = "IOT_PORTAL_API_URL";
pub const ENV_API_STAGE: &str = "IOT_PORTAL_API_STAGE";
pub const ENV_HTTP_PORT: &str = "IOT_PORTAL_HTTP_PORT";
pub const ENV_GATEWAY_URL: &str = "IOT_PORTAL_GATEWAY_URL";
pub const ENV_ID_TOKEN: &str = "IOT_PORTAL_ID_TOKEN";

pub const DEFAULT_STAGE: &str = "prod";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set; the gateway needs an upstream API base URL")]
    Missing(&'static str),
    #[error("{name} is not a valid absolute http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("{name} is not a valid port: {value}")]
    InvalidPort { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub upstream_base_url: Url,
    /// Deployment stage path segment; empty means none.
    pub stage: String,
    pub bind_addr: SocketAddr,
}

impl GatewayConfig {
    pub fn new(upstream_base_url: &str, stage: &str, http_port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            upstream_base_url: parse_http_url(ENV_API_URL, upstream_base_url)?,
            stage: stage.trim_matches('/').to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var(ENV_API_URL)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_API_URL))?;
        let stage = std::env::var(ENV_API_STAGE).unwrap_or_else(|_| DEFAULT_STAGE.to_string());
        let port = http_port(std::env::var(ENV_HTTP_PORT).ok())?;
        Self::new(&base, &stage, port)
    }

    /// Upstream URL for one operation: `{base}/{stage}/{name}`.
    pub fn upstream_url(&self, operation_name: &str) -> String {
        let base = self.upstream_base_url.as_str().trim_end_matches('/');
        if self.stage.is_empty() {
            format!("{}/{}", base, operation_name)
        } else {
            format!("{}/{}/{}", base, self.stage, operation_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub gateway_base_url: Url,
}

impl ClientConfig {
    pub fn new(gateway_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { gateway_base_url: parse_http_url(ENV_GATEWAY_URL, gateway_base_url)? })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var(ENV_GATEWAY_URL).unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
        Self::new(&base)
    }
}

/// Gateway port from an optional `IOT_PORTAL_HTTP_PORT` value; unset means the default,
/// anything unparsable is an error.
pub fn http_port(value: Option<String>) -> Result<u16, ConfigError> {
    match value {
        Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort { name: ENV_HTTP_PORT, value: v }),
        None => Ok(DEFAULT_HTTP_PORT),
    }
}

fn parse_http_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl { name, value: value.to_string() };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(invalid()),
    }
}
