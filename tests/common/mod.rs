use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use iot_portal::config::GatewayConfig;
use iot_portal::server::{build_router, AppState};

/// What the mock upstream saw for one call.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockUpstream {
    pub seen: Arc<Mutex<Vec<Seen>>>,
}

async fn record(state: &MockUpstream, method: &str, uri: &Uri, query: Option<String>, headers: &HeaderMap) {
    state.seen.lock().push(Seen {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        authorization: headers.get("authorization").and_then(|v| v.to_str().ok()).map(|s| s.to_string()),
    });
}

async fn role(State(s): State<MockUpstream>, uri: Uri, RawQuery(q): RawQuery, headers: HeaderMap) -> Json<Value> {
    record(&s, "GET", &uri, q, &headers).await;
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(a) if a.contains("manager") => Json(json!({"group": "manager"})),
        _ => Json(json!({"message": "User does not belong to any group"})),
    }
}

async fn devices(State(s): State<MockUpstream>, uri: Uri, RawQuery(q): RawQuery, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    record(&s, "GET", &uri, q, &headers).await;
    if headers.get("authorization").map(|v| v.is_empty()).unwrap_or(true) {
        // Policy denial still carries a JSON body
        return (StatusCode::FORBIDDEN, Json(json!({"Message": "User is not authorized to access this resource"})));
    }
    (StatusCode::OK, Json(json!({"devices": ["d1", "d2"]})))
}

async fn download(State(s): State<MockUpstream>, uri: Uri, RawQuery(q): RawQuery, headers: HeaderMap) -> Json<Value> {
    record(&s, "POST", &uri, q, &headers).await;
    Json(json!({"message": "Successfully published to IoT Core"}))
}

async fn not_json() -> &'static str { "<html>gateway timeout</html>" }

async fn serve(app: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (handle, addr)
}

/// Start the mock upstream API (stage `prod`) on an ephemeral port.
pub async fn start_upstream() -> (MockUpstream, SocketAddr, JoinHandle<()>) {
    let mock = MockUpstream::default();
    let app = Router::new()
        .route("/prod/role", get(role))
        .route("/prod/devices", get(devices))
        .route("/prod/download", post(download))
        .route("/broken/role", get(not_json))
        .route("/broken/devices", get(not_json))
        .with_state(mock.clone());
    let (handle, addr) = serve(app).await;
    (mock, addr, handle)
}

/// Start the real gateway in front of `upstream_base` on an ephemeral port.
pub async fn start_gateway(upstream_base: &str, stage: &str) -> (SocketAddr, JoinHandle<()>) {
    let cfg = GatewayConfig::new(upstream_base, stage, 0).expect("gateway config");
    let state = AppState::new(cfg).expect("gateway state");
    let (handle, addr) = serve(build_router(state)).await;
    (addr, handle)
}

/// Start the real gateway mounted under a path prefix, as behind a path-routing proxy.
pub async fn start_gateway_under(prefix: &str, upstream_base: &str, stage: &str) -> (SocketAddr, JoinHandle<()>) {
    let cfg = GatewayConfig::new(upstream_base, stage, 0).expect("gateway config");
    let state = AppState::new(cfg).expect("gateway state");
    let (handle, addr) = serve(Router::new().nest(prefix, build_router(state))).await;
    (addr, handle)
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    addr
}
