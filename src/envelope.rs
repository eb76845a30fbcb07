//! Response envelope handed to the UI layer: the upstream payload on success or
//! `{ "error": "<message>" }` on failure, never both.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Value),
    Failure(String),
}

impl Envelope {
    pub fn failure<S: Into<String>>(msg: S) -> Self { Envelope::Failure(msg.into()) }

    pub fn is_success(&self) -> bool { matches!(self, Envelope::Success(_)) }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Envelope::Success(v) => Some(v),
            Envelope::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(m) => Some(m.as_str()),
        }
    }
}

impl From<AppError> for Envelope {
    fn from(err: AppError) -> Self { Envelope::Failure(err.to_string()) }
}

impl From<Result<Value, AppError>> for Envelope {
    fn from(res: Result<Value, AppError>) -> Self {
        match res {
            Ok(v) => Envelope::Success(v),
            Err(e) => e.into(),
        }
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Envelope::Success(v) => v.serialize(serializer),
            Envelope::Failure(m) => json!({ "error": m }).serialize(serializer),
        }
    }
}
