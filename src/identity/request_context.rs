use uuid::Uuid;

use crate::operation::Operation;

/// Per-request data the gateway threads through logging for one forwarded call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub operation: Operation,
    /// Whether the inbound request carried a non-empty Authorization header.
    /// Only presence is recorded; the value itself is never logged.
    pub has_authorization: bool,
}

impl RequestContext {
    pub fn new(operation: Operation, authorization: &[u8]) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            operation,
            has_authorization: authorization.iter().any(|b| !b.is_ascii_whitespace()),
        }
    }
}
