//! Upstream hop of the gateway: one HTTP call to the policy-enforcing API per forwarded
//! operation. Behind a trait so handlers can be exercised against a double.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde_json::Value;

use crate::error::AppResult;
use crate::operation::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    /// Sent as the upstream Authorization header byte for byte as received, even when empty.
    pub authorization: HeaderValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fails only when the call cannot complete or the body is not JSON.
    /// A non-2xx status with a JSON body is a successful forward.
    async fn forward(&self, req: UpstreamRequest) -> AppResult<UpstreamResponse>;
}

#[derive(Clone, Default)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(client: reqwest::Client) -> Self { Self { client } }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn forward(&self, req: UpstreamRequest) -> AppResult<UpstreamResponse> {
        let method = match req.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let resp = self.client
            .request(method, &req.url)
            .header(AUTHORIZATION, req.authorization)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        Ok(UpstreamResponse { status, body })
    }
}
