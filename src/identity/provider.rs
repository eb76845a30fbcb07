use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::session::SessionToken;
use crate::error::{AppError, AppResult};

/// Source of the caller's identity token. Called once per outgoing operation; the
/// dispatcher does not retry when it fails.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn token(&self) -> AppResult<SessionToken>;
}

/// Fixed token, replaceable at runtime (sign-in / sign-out).
#[derive(Debug, Default)]
pub struct StaticSessionProvider {
    token: RwLock<Option<SessionToken>>,
}

impl StaticSessionProvider {
    pub fn new(token: Option<SessionToken>) -> Self { Self { token: RwLock::new(token) } }

    pub fn signed_in<S: Into<String>>(raw: S) -> Self { Self::new(SessionToken::new(raw)) }

    pub fn signed_out() -> Self { Self::new(None) }

    pub fn set(&self, token: Option<SessionToken>) { *self.token.write() = token; }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn token(&self) -> AppResult<SessionToken> {
        self.token.read().clone().ok_or_else(AppError::no_session)
    }
}

/// Reads the token from an environment variable on every call so rotation is picked up.
#[derive(Debug, Clone)]
pub struct EnvSessionProvider {
    var: String,
}

impl EnvSessionProvider {
    pub fn new<S: Into<String>>(var: S) -> Self { Self { var: var.into() } }
}

impl Default for EnvSessionProvider {
    fn default() -> Self { Self::new(crate::config::ENV_ID_TOKEN) }
}

#[async_trait]
impl SessionProvider for EnvSessionProvider {
    async fn token(&self) -> AppResult<SessionToken> {
        let raw = std::env::var(&self.var).unwrap_or_default();
        match SessionToken::new(raw) {
            Some(t) => Ok(t),
            None => {
                debug!(target: "session", var = %self.var, "no identity token in environment");
                Err(AppError::no_session())
            }
        }
    }
}
