//! Portal facade: wires provider, transport, dispatcher and role resolver around one
//! shared UI store and exposes the user-facing actions.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::dispatcher::Dispatcher;
use super::role::{Role, RoleResolver};
use super::state::{UiEvent, UiState, UiStore};
use super::transport::{GatewayTransport, HttpTransport};
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::identity::SessionProvider;
use crate::operation::{Method, Operation, S3_PATH_PARAM};

static S3_PATH_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\-_./]").unwrap());

/// Accept an object path only when every character is in `[A-Za-z0-9-_./]`.
/// Anything else is refused, never rewritten.
pub fn check_s3_path(raw: &str) -> AppResult<&str> {
    match S3_PATH_DISALLOWED.find(raw) {
        Some(m) => Err(AppError::invalid_input(format!(
            "s3Path contains unsupported character {:?} at {}", m.as_str(), m.start()
        ))),
        None => Ok(raw),
    }
}

pub struct Portal {
    dispatcher: Arc<Dispatcher>,
    resolver: RoleResolver,
}

impl Portal {
    pub fn new(provider: Arc<dyn SessionProvider>, transport: Arc<dyn GatewayTransport>) -> Self {
        let store = Arc::new(UiStore::default());
        let dispatcher = Arc::new(Dispatcher::new(provider, transport, store));
        let resolver = RoleResolver::new(dispatcher.clone());
        Self { dispatcher, resolver }
    }

    pub fn connect(config: &ClientConfig, provider: Arc<dyn SessionProvider>) -> AppResult<Self> {
        let transport = HttpTransport::new(config.gateway_base_url.clone())?;
        Ok(Self::new(provider, Arc::new(transport)))
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> { &self.dispatcher }

    pub fn state(&self) -> UiState { self.dispatcher.store().snapshot() }

    /// Run once when the portal is mounted.
    pub async fn verify_session(&self) -> Role { self.resolver.verify_session().await }

    pub async fn list_devices(&self) -> AppResult<Value> {
        self.dispatcher.dispatch(Operation::Devices.name(), Method::Get, None, None).await
    }

    pub async fn download_file(&self, s3_path: &str) -> AppResult<Value> {
        let s3_path = match check_s3_path(s3_path) {
            Ok(p) => p,
            Err(e) => {
                self.dispatcher.store().apply(UiEvent::DispatchCompleted { result: Some(Envelope::from(e.clone())) });
                return Err(e);
            }
        };
        let mut query = BTreeMap::new();
        query.insert(S3_PATH_PARAM.to_string(), s3_path.to_string());
        self.dispatcher.dispatch(Operation::Download.name(), Method::Post, Some(query), None).await
    }
}
