//! Gateway hop of the client: sends one built request to the portal gateway.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::error::{AppError, AppResult};
use crate::identity::SessionToken;
use crate::operation::{Method, OperationDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub method: Method,
    /// Path and query relative to the gateway base, e.g. `/api/download?s3Path=x`.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl GatewayRequest {
    /// Bearer Authorization plus a JSON content type; the body is serialized when present.
    pub fn build(desc: &OperationDescriptor, token: &SessionToken) -> AppResult<Self> {
        let body = match desc.body() {
            Some(v) => Some(serde_json::to_string(v)?),
            None => None,
        };
        Ok(Self {
            method: desc.method(),
            target: desc.target(),
            headers: vec![
                ("Authorization".to_string(), token.bearer()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn send(&self, req: GatewayRequest) -> AppResult<GatewayResponse>;
}

#[derive(Clone)]
pub struct HttpTransport {
    base: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    /// A base with a path prefix (`http://host/portal`) keeps it; targets resolve beneath it.
    pub fn new(mut base: Url) -> AppResult<Self> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, target: &str) -> AppResult<Url> {
        self.base
            .join(target.trim_start_matches('/'))
            .map_err(|e| AppError::transport(e.to_string()))
    }
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    async fn send(&self, req: GatewayRequest) -> AppResult<GatewayResponse> {
        let url = self.endpoint(&req.target)?;
        let mut headers = HeaderMap::new();
        for (k, v) in &req.headers {
            let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| AppError::transport(e.to_string()))?;
            let value = HeaderValue::from_str(v).map_err(|e| AppError::transport(e.to_string()))?;
            headers.insert(name, value);
        }
        let builder = match req.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let builder = match req.body {
            Some(b) => builder.headers(headers).body(b),
            None => builder.headers(headers),
        };
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(GatewayResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use std::collections::BTreeMap;

    #[test]
    fn build_sets_bearer_and_content_type() {
        let token = SessionToken::new("abc.def.ghi").unwrap();
        let mut q = BTreeMap::new();
        q.insert("s3Path".to_string(), "logs/today.txt".to_string());
        let desc = OperationDescriptor::new(Operation::Download, Method::Post, Some(q), Some(serde_json::json!({"k": 1})));
        let req = GatewayRequest::build(&desc, &token).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.target, "/api/download?s3Path=logs%2Ftoday.txt");
        assert_eq!(req.header("authorization"), Some("Bearer abc.def.ghi"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"k":1}"#));
    }

    #[test]
    fn build_without_body() {
        let token = SessionToken::new("t").unwrap();
        let desc = OperationDescriptor::new(Operation::Role, Method::Get, None, None);
        let req = GatewayRequest::build(&desc, &token).unwrap();
        assert_eq!(req.target, "/api/role");
        assert!(req.body.is_none());
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let t = HttpTransport::new(Url::parse("http://127.0.0.1:3000/portal").unwrap()).unwrap();
        assert_eq!(t.endpoint("/api/devices").unwrap().as_str(), "http://127.0.0.1:3000/portal/api/devices");
        assert_eq!(
            t.endpoint("/api/download?s3Path=a%2Fb.txt").unwrap().as_str(),
            "http://127.0.0.1:3000/portal/api/download?s3Path=a%2Fb.txt"
        );

        let t = HttpTransport::new(Url::parse("http://127.0.0.1:3000/").unwrap()).unwrap();
        assert_eq!(t.endpoint("/api/role").unwrap().as_str(), "http://127.0.0.1:3000/api/role");
    }
}
