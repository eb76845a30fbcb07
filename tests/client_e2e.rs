//! Portal client against the real gateway and a mock upstream: dispatcher, role
//! resolution and UI state over actual HTTP.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::{closed_addr, start_gateway, start_gateway_under, start_upstream};
use iot_portal::client::{Portal, Role, UnknownReason};
use iot_portal::config::ClientConfig;
use iot_portal::envelope::Envelope;
use iot_portal::error::AppError;
use iot_portal::identity::StaticSessionProvider;

fn portal_for(gateway: std::net::SocketAddr, token: Option<&str>) -> Portal {
    let cfg = ClientConfig::new(&format!("http://{}", gateway)).expect("client config");
    let provider = match token {
        Some(t) => StaticSessionProvider::signed_in(t),
        None => StaticSessionProvider::signed_out(),
    };
    Portal::connect(&cfg, Arc::new(provider)).expect("portal")
}

#[tokio::test]
async fn list_devices_end_to_end() {
    let (mock, up, _u) = start_upstream().await;
    let (gw, _g) = start_gateway(&format!("http://{}", up), "prod").await;
    let portal = portal_for(gw, Some("id-token"));

    let data = portal.list_devices().await.expect("devices");
    assert_eq!(data, json!({"devices": ["d1", "d2"]}));
    let state = portal.state();
    assert_eq!(state.last_result, Some(Envelope::Success(json!({"devices": ["d1", "d2"]}))));
    assert!(!state.is_loading());
    assert_eq!(mock.seen.lock()[0].authorization.as_deref(), Some("Bearer id-token"));
}

#[tokio::test]
async fn session_verification_resolves_group() {
    let (_mock, up, _u) = start_upstream().await;
    let (gw, _g) = start_gateway(&format!("http://{}", up), "prod").await;

    let portal = portal_for(gw, Some("manager"));
    assert_eq!(portal.verify_session().await, Role::Group("manager".into()));
    assert_eq!(portal.state().last_result, None);

    let portal = portal_for(gw, Some("operator-without-group"));
    assert_eq!(portal.verify_session().await, Role::Unknown(UnknownReason::NotAssigned));
}

#[tokio::test]
async fn download_sends_encoded_path() {
    let (mock, up, _u) = start_upstream().await;
    let (gw, _g) = start_gateway(&format!("http://{}", up), "prod").await;
    let portal = portal_for(gw, Some("manager"));

    portal.download_file("a/b-c_1.txt").await.expect("download");
    assert_eq!(mock.seen.lock()[0].query.as_deref(), Some("s3Path=a%2Fb-c_1.txt"));
    assert!(portal.state().last_result.expect("result").is_success());
}

#[tokio::test]
async fn no_session_makes_no_calls() {
    let (mock, up, _u) = start_upstream().await;
    let (gw, _g) = start_gateway(&format!("http://{}", up), "prod").await;
    let portal = portal_for(gw, None);

    assert_eq!(portal.list_devices().await.unwrap_err(), AppError::no_session());
    assert_eq!(portal.download_file("x").await.unwrap_err(), AppError::no_session());
    assert_eq!(portal.verify_session().await, Role::Unknown(UnknownReason::LookupFailed));
    assert!(mock.seen.lock().is_empty());
    assert_eq!(portal.state().last_result, Some(Envelope::failure("No token available")));
}

#[tokio::test]
async fn gateway_500_surfaces_as_http_error_and_role_degrades_silently() {
    let dead = closed_addr().await;
    let (gw, _g) = start_gateway(&format!("http://{}", dead), "prod").await;
    let portal = portal_for(gw, Some("manager"));

    let err = portal.list_devices().await.unwrap_err();
    assert_eq!(err, AppError::http(500));
    assert_eq!(portal.state().last_result, Some(Envelope::failure("HTTP error, status: 500")));

    let role = portal.verify_session().await;
    assert_eq!(role, Role::Unknown(UnknownReason::LookupFailed));
    // the role failure did not overwrite the devices error
    assert_eq!(portal.state().last_result, Some(Envelope::failure("HTTP error, status: 500")));
    assert!(portal.state().actions_enabled());
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error() {
    let dead = closed_addr().await;
    let portal = portal_for(dead, Some("t"));
    let err = portal.list_devices().await.unwrap_err();
    assert_eq!(err.code_str(), "transport_error");
    assert!(!portal.state().is_loading());
}

#[tokio::test]
async fn gateway_base_with_path_prefix_is_honoured() {
    let (mock, up, _u) = start_upstream().await;
    let (gw, _g) = start_gateway_under("/portal", &format!("http://{}", up), "prod").await;

    for base in [format!("http://{}/portal", gw), format!("http://{}/portal/", gw)] {
        let cfg = ClientConfig::new(&base).expect("client config");
        let portal = Portal::connect(&cfg, Arc::new(StaticSessionProvider::signed_in("id-token"))).expect("portal");
        let data = portal.list_devices().await.expect("devices under prefix");
        assert_eq!(data, json!({"devices": ["d1", "d2"]}));
    }
    assert_eq!(mock.seen.lock().len(), 2);
}
