//! Closed set of operations the portal may issue, and the allow-list check that guards it.
//! Both the client dispatcher and the gateway route call [`validate`]; the gateway check is
//! the trust boundary.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const S3_PATH_PARAM: &str = "s3Path";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Role,
    Devices,
    Download,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Role, Operation::Devices, Operation::Download];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Role => "role",
            Operation::Devices => "devices",
            Operation::Download => "download",
        }
    }

    /// HTTP method the operation is exposed and forwarded with.
    pub fn method(&self) -> Method {
        match self {
            Operation::Role | Operation::Devices => Method::Get,
            Operation::Download => Method::Post,
        }
    }

    /// Gateway route the client calls, e.g. `/api/devices`.
    pub fn gateway_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    pub fn is_role_lookup(&self) -> bool {
        matches!(self, Operation::Role)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Allow-list check. Exact, case-sensitive match on the wire name.
pub fn validate(name: &str) -> AppResult<Operation> {
    Operation::ALL
        .iter()
        .copied()
        .find(|op| op.name() == name)
        .ok_or_else(AppError::invalid_operation)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }

    pub fn parse(s: &str) -> Option<Method> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            _ => None,
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing call as built by the dispatcher. Fields are private so a descriptor
/// cannot be altered after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    operation: Operation,
    method: Method,
    query: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
}

impl OperationDescriptor {
    pub fn new(
        operation: Operation,
        method: Method,
        query: Option<BTreeMap<String, String>>,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self { operation, method, query: query.unwrap_or_default(), body }
    }

    pub fn operation(&self) -> Operation { self.operation }
    pub fn method(&self) -> Method { self.method }
    pub fn query(&self) -> &BTreeMap<String, String> { &self.query }
    pub fn body(&self) -> Option<&serde_json::Value> { self.body.as_ref() }

    /// Gateway path with the query string appended, e.g. `/api/download?s3Path=a%2Fb`.
    pub fn target(&self) -> String {
        let mut url = self.operation.gateway_path();
        if !self.query.is_empty() {
            let qs = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&qs);
        }
        url
    }
}
