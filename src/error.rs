//! Unified application error model and mapping helpers.
//! One error enum is shared by the gateway handlers, the client dispatcher and the
//! binaries, along with its mapping to HTTP status codes and envelope messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const NO_SESSION_MESSAGE: &str = "No token available";
pub const INVALID_OPERATION_MESSAGE: &str = "Invalid endpoint";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// No identity token could be obtained; nothing was sent.
    NoSession { code: String, message: String },
    /// Operation name outside the allow-list; nothing was sent.
    InvalidOperation { code: String, message: String },
    MethodNotAllowed { code: String, message: String },
    /// The gateway answered the dispatcher with a non-2xx status.
    Http { code: String, message: String, status: u16 },
    /// The forwarding call could not complete or its body was not JSON.
    TransportOrDecode { code: String, message: String },
    /// A caller-supplied value was refused before dispatch.
    InvalidInput { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::NoSession { code, .. }
            | AppError::InvalidOperation { code, .. }
            | AppError::MethodNotAllowed { code, .. }
            | AppError::Http { code, .. }
            | AppError::TransportOrDecode { code, .. }
            | AppError::InvalidInput { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::NoSession { message, .. }
            | AppError::InvalidOperation { message, .. }
            | AppError::MethodNotAllowed { message, .. }
            | AppError::Http { message, .. }
            | AppError::TransportOrDecode { message, .. }
            | AppError::InvalidInput { message, .. } => message.as_str(),
        }
    }

    pub fn no_session() -> Self { AppError::NoSession { code: "no_session".into(), message: NO_SESSION_MESSAGE.into() } }
    pub fn invalid_operation() -> Self { AppError::InvalidOperation { code: "invalid_operation".into(), message: INVALID_OPERATION_MESSAGE.into() } }
    pub fn method_not_allowed<S: Into<String>>(msg: S) -> Self { AppError::MethodNotAllowed { code: "method_not_allowed".into(), message: msg.into() } }
    pub fn http(status: u16) -> Self {
        AppError::Http { code: "http_error".into(), message: format!("HTTP error, status: {}", status), status }
    }
    pub fn transport<S: Into<String>>(msg: S) -> Self { AppError::TransportOrDecode { code: "transport_error".into(), message: msg.into() } }
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self { AppError::InvalidInput { code: "invalid_input".into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::NoSession { .. } => 401,
            AppError::InvalidOperation { .. } => 404,
            AppError::MethodNotAllowed { .. } => 405,
            AppError::Http { status, .. } => *status,
            AppError::TransportOrDecode { .. } => 500,
            AppError::InvalidInput { .. } => 400,
        }
    }
}

// Envelopes carry the bare message, so Display does not prefix the code.
impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::transport(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::transport(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as transport unless downcasted elsewhere
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(other) => AppError::transport(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
