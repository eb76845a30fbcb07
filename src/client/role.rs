//! Role resolution for UI gating. The caller's group comes from the `role` operation;
//! any failure degrades to an explicit unknown role instead of an error.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use super::dispatcher::Dispatcher;
use super::state::UiEvent;
use crate::operation::{Method, Operation};

pub const NOT_ASSIGNED_LABEL: &str = "user is not assigned to group";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// Lookup succeeded but the payload carried no group.
    NotAssigned,
    /// Session check or dispatch failed.
    LookupFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Group(String),
    Unknown(UnknownReason),
}

impl Role {
    /// Reads the `group` field. Missing, null, empty or non-string values mean not assigned.
    pub fn from_payload(payload: &Value) -> Role {
        match payload.get("group").and_then(|g| g.as_str()) {
            Some(g) if !g.is_empty() => Role::Group(g.to_string()),
            _ => Role::Unknown(UnknownReason::NotAssigned),
        }
    }

    pub fn group(&self) -> Option<&str> {
        match self {
            Role::Group(g) => Some(g.as_str()),
            Role::Unknown(_) => None,
        }
    }

    pub fn is_unknown(&self) -> bool { matches!(self, Role::Unknown(_)) }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Group(g) => f.write_str(g),
            Role::Unknown(_) => f.write_str(NOT_ASSIGNED_LABEL),
        }
    }
}

pub struct RoleResolver {
    dispatcher: Arc<Dispatcher>,
}

impl RoleResolver {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self { Self { dispatcher } }

    /// Look up the caller's role and publish it. Never fails and never touches `last_result`.
    pub async fn resolve_role(&self) -> Role {
        let role = match self.dispatcher.dispatch(Operation::Role.name(), Method::Get, None, None).await {
            Ok(payload) => Role::from_payload(&payload),
            Err(e) => {
                warn!(target: "role", "Error fetching user role: {}", e);
                Role::Unknown(UnknownReason::LookupFailed)
            }
        };
        info!(target: "role", role = %role, "role resolved");
        self.dispatcher.store().apply(UiEvent::RoleResolved(role.clone()));
        role
    }

    /// Session verification cycle: confirm a session exists, then derive the role.
    pub async fn verify_session(&self) -> Role {
        if let Err(e) = self.dispatcher.provider().token().await {
            error!(target: "role", "Authentication verification failed: {}", e);
            let role = Role::Unknown(UnknownReason::LookupFailed);
            self.dispatcher.store().apply(UiEvent::RoleResolved(role.clone()));
            return role;
        }
        self.resolve_role().await
    }
}
