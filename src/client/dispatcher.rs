//! Request dispatcher: every client call goes through [`Dispatcher::dispatch`], which
//! checks the allow-list, fetches the session token, builds the gateway request and
//! folds the outcome into the shared UI state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use super::state::{UiEvent, UiStore};
use super::transport::{GatewayRequest, GatewayTransport};
use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::identity::SessionProvider;
use crate::operation::{self, Method, Operation, OperationDescriptor};

pub struct Dispatcher {
    provider: Arc<dyn SessionProvider>,
    transport: Arc<dyn GatewayTransport>,
    store: Arc<UiStore>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn SessionProvider>, transport: Arc<dyn GatewayTransport>, store: Arc<UiStore>) -> Self {
        Self { provider, transport, store }
    }

    pub fn store(&self) -> &Arc<UiStore> { &self.store }

    pub fn provider(&self) -> &Arc<dyn SessionProvider> { &self.provider }

    /// Issue one operation. The loading phase covers the whole call, failures included.
    /// Except for the role lookup, the outcome also becomes the shared `last_result`.
    pub async fn dispatch(
        &self,
        name: &str,
        method: Method,
        query: Option<BTreeMap<String, String>>,
        body: Option<Value>,
    ) -> AppResult<Value> {
        self.store.apply(UiEvent::DispatchStarted);
        let res = self.send(name, method, query, body).await;
        if let Err(e) = &res {
            error!(target: "dispatch", operation = %name, code = e.code_str(), "Error: {}", e);
        }
        let owns_result = name != Operation::Role.name();
        let result = owns_result.then(|| Envelope::from(res.clone()));
        self.store.apply(UiEvent::DispatchCompleted { result });
        res
    }

    async fn send(
        &self,
        name: &str,
        method: Method,
        query: Option<BTreeMap<String, String>>,
        body: Option<Value>,
    ) -> AppResult<Value> {
        let op = operation::validate(name)?;
        let token = self.provider.token().await?;
        let desc = OperationDescriptor::new(op, method, query, body);
        let req = GatewayRequest::build(&desc, &token)?;
        debug!(target: "dispatch", operation = %op, method = %method, path = %req.target, token = %token.masked(), "sending");
        let resp = self.transport.send(req).await?;
        if !(200..300).contains(&resp.status) {
            return Err(AppError::http(resp.status));
        }
        let data: Value = serde_json::from_slice(&resp.body)?;
        Ok(data)
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
