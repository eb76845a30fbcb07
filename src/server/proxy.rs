//! `/api/{operation}` handler: allow-list check, identity pass-through, forward, normalize.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use axum::extract::{Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue, Method as HttpMethod, StatusCode};
use axum::Json;
use futures_util::FutureExt; // for catch_unwind on async blocks
use tracing::{error, info, warn};

use super::AppState;
use crate::envelope::Envelope;
use crate::error::AppError;
use crate::identity::RequestContext;
use crate::operation::{self, Method, Operation, S3_PATH_PARAM};

use super::upstream::UpstreamRequest;

type Reply = (StatusCode, Json<Envelope>);

fn reject(err: AppError) -> Reply {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.into()))
}

/// Upstream target for an operation, with the download path forwarded as an encoded query value.
pub fn upstream_target(state: &AppState, op: Operation, params: &HashMap<String, String>) -> String {
    let mut url = state.config.upstream_url(op.name());
    if op == Operation::Download {
        let s3_path = params.get(S3_PATH_PARAM).map(String::as_str).unwrap_or("");
        url.push_str(&format!("?{}={}", S3_PATH_PARAM, urlencoding::encode(s3_path)));
    }
    url
}

pub async fn proxy_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    method: HttpMethod,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let op = match operation::validate(&name) {
        Ok(op) => op,
        Err(e) => {
            warn!(target: "gateway", operation = %name, "rejected operation outside allow-list");
            return reject(e);
        }
    };
    if Method::parse(method.as_str()) != Some(op.method()) {
        return reject(AppError::method_not_allowed(format!(
            "{} is not allowed for {}; expected {}", method, op, op.method()
        )));
    }

    // Identity is passed through untouched; the upstream decides.
    let authorization = headers
        .get(AUTHORIZATION)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));
    let ctx = RequestContext::new(op, authorization.as_bytes());
    let req = UpstreamRequest { method: op.method(), url: upstream_target(&state, op, &params), authorization };
    info!(target: "gateway", request_id = %ctx.request_id, operation = %op, authorized = ctx.has_authorization, "forwarding");

    let fut = state.upstream.forward(req);
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(resp)) => {
            // Upstream status is not surfaced; a JSON error body goes back as a 200.
            if !(200..300).contains(&resp.status) {
                warn!(target: "gateway", request_id = %ctx.request_id, operation = %op, status = resp.status, "upstream returned non-success status");
            }
            (StatusCode::OK, Json(Envelope::Success(resp.body)))
        }
        Ok(Err(e)) => {
            error!(target: "gateway", request_id = %ctx.request_id, operation = %op, "forward failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::failure(e.to_string())))
        }
        Err(panic_payload) => {
            let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() { *s }
                      else if let Some(s) = panic_payload.downcast_ref::<String>() { s.as_str() }
                      else { "panic" };
            error!(target: "panic", request_id = %ctx.request_id, "gateway forward panic: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::failure(msg)))
        }
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
