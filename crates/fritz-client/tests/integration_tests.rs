//! Integration tests for fritz-client
//!
//! These tests run the client against `MockGateway`, an in-process fake of
//! the gateway's login and smart-home endpoints served over real HTTP.

use fritz_client::testing::{thermostat_unit, MockGateway, TestServer};
use fritz_client::{FritzClient, FritzError};
use reqwest::Method;

const USER: &str = "smarthome";
const PASSWORD: &str = "1example!";

// =============================================================================
// Test Helpers
// =============================================================================

async fn start(gateway: &MockGateway) -> TestServer {
    TestServer::start(gateway.router())
        .await
        .expect("Failed to start test server")
}

fn client_for(server: &TestServer, password: &str) -> FritzClient {
    FritzClient::new(&server.base_url(), USER, password).expect("Failed to create client")
}

// =============================================================================
// Login Tests
// =============================================================================

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let gateway = MockGateway::new(USER, PASSWORD);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    client.ensure_authenticated().await.unwrap();

    assert!(client.session().is_authenticated());
    let stats = gateway.stats();
    assert_eq!(stats.challenge_requests, 1);
    assert_eq!(stats.login_requests, 1);
}

#[tokio::test]
async fn test_ensure_authenticated_is_noop_with_session() {
    let gateway = MockGateway::new(USER, PASSWORD);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    client.ensure_authenticated().await.unwrap();
    client.ensure_authenticated().await.unwrap();
    client.ensure_authenticated().await.unwrap();

    assert_eq!(gateway.stats().challenge_requests, 1);
    assert_eq!(gateway.stats().login_requests, 1);
}

#[tokio::test]
async fn test_wrong_password_fails_and_stays_unauthenticated() {
    let gateway = MockGateway::new(USER, PASSWORD);
    let server = start(&gateway).await;
    let mut client = client_for(&server, "wrong");

    let err = client.ensure_authenticated().await.unwrap_err();
    assert!(matches!(err, FritzError::AuthFailed), "{err}");
    assert!(!client.session().is_authenticated());

    // Nothing was stored, so the next call logs in again
    let err = client.ensure_authenticated().await.unwrap_err();
    assert!(matches!(err, FritzError::AuthFailed));
    assert_eq!(gateway.stats().login_requests, 2);
    assert_eq!(gateway.stats().challenge_requests, 2);
}

#[tokio::test]
async fn test_block_time_fails_without_login_attempt() {
    let gateway = MockGateway::new(USER, PASSWORD).with_block_time(64);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    let err = client.ensure_authenticated().await.unwrap_err();
    assert!(matches!(err, FritzError::Lockout { seconds: 64 }), "{err}");
    assert_eq!(gateway.stats().challenge_requests, 1);
    assert_eq!(gateway.stats().login_requests, 0);
}

#[tokio::test]
async fn test_unsupported_version_issues_no_login_request() {
    for challenge in ["1234567z", "1$100$a1b2$50$c3d4", "3$100$a1b2$50$c3d4"] {
        let gateway = MockGateway::new(USER, PASSWORD).with_challenge(challenge);
        let server = start(&gateway).await;
        let mut client = client_for(&server, PASSWORD);

        let err = client.ensure_authenticated().await.unwrap_err();
        assert!(matches!(err, FritzError::UnsupportedVersion(_)), "{err}");
        assert_eq!(gateway.stats().login_requests, 0, "{challenge}");
    }
}

// =============================================================================
// Authorized Request Tests
// =============================================================================

#[tokio::test]
async fn test_authorized_request_sends_session_id() {
    let gateway =
        MockGateway::new(USER, PASSWORD).with_thermostat("grouped-1", "Office", 21.0, 0.0);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    client.ensure_authenticated().await.unwrap();
    let response = client
        .authorized_request(
            Method::GET,
            "/api/v0/smarthome/configuration/units/grouped-1",
            None,
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(gateway.stats().rejected_requests, 0);
}

#[tokio::test]
async fn test_stale_session_is_not_retried() {
    let gateway =
        MockGateway::new(USER, PASSWORD).with_thermostat("grouped-1", "Office", 21.0, 0.0);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    client.thermostat_info("grouped-1").await.unwrap();
    gateway.expire_session();

    let err = client.thermostat_info("grouped-1").await.unwrap_err();
    match err {
        FritzError::ServerError { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Session invalid");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(gateway.stats().login_requests, 1);
    assert_eq!(gateway.stats().rejected_requests, 1);
}

#[tokio::test]
async fn test_error_without_body_uses_status_text() {
    let gateway = MockGateway::new(USER, PASSWORD);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    let err = client.thermostat_info("does-not-exist").await.unwrap_err();
    match err {
        FritzError::ServerError { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Thermostat Tests
// =============================================================================

#[tokio::test]
async fn test_thermostat_info_logs_in_and_maps_unit() {
    let gateway =
        MockGateway::new(USER, PASSWORD).with_thermostat("grouped-1", "Office", 20.5, -1.5);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    let info = client.thermostat_info("grouped-1").await.unwrap();

    assert_eq!(info.id, "grouped-1");
    assert_eq!(info.name, "Office");
    assert!(info.active);
    assert_eq!(info.adapted_temp, 20.5);
    assert_eq!(info.offset, -1.5);
    assert_eq!(info.measured_temp, 22.0);
    assert_eq!(gateway.stats().login_requests, 1);
    assert_eq!(gateway.stats().unit_reads, 1);
}

#[tokio::test]
async fn test_disconnected_thermostat_is_inactive() {
    let gateway = MockGateway::new(USER, PASSWORD).with_unit(
        "grouped-2",
        thermostat_unit("grouped-2", "Attic", Some(false), 15.0, 0.0),
    );
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    let info = client.thermostat_info("grouped-2").await.unwrap();
    assert!(!info.active);
}

#[tokio::test]
async fn test_set_thermostat_offset() {
    let gateway =
        MockGateway::new(USER, PASSWORD).with_thermostat("grouped-1", "Office", 22.0, 0.0);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    client.set_thermostat_offset("grouped-1", -2.0).await.unwrap();

    let stats = gateway.stats();
    assert_eq!(stats.offset_writes, vec![("grouped-1".to_string(), -2.0)]);

    let stored = gateway.unit("grouped-1").unwrap();
    let offset = stored
        .interfaces
        .thermostat_interface
        .and_then(|t| t.temperature_offset)
        .unwrap();
    assert_eq!(offset.sensor_mode.as_deref(), Some("internal"));
    assert_eq!(offset.internal_offset, Some(-2.0));

    let info = client.thermostat_info("grouped-1").await.unwrap();
    assert_eq!(info.offset, -2.0);
    assert_eq!(info.adapted_temp, 20.0);
    assert_eq!(info.measured_temp, 22.0);
    // one login for both calls
    assert_eq!(gateway.stats().login_requests, 1);
}

#[tokio::test]
async fn test_unreachable_gateway_is_transport_error() {
    let gateway =
        MockGateway::new(USER, PASSWORD).with_thermostat("grouped-1", "Office", 21.0, 0.0);
    let server = start(&gateway).await;
    let mut client = client_for(&server, PASSWORD);

    client.ensure_authenticated().await.unwrap();
    server.shutdown().await;

    let err = client.thermostat_info("grouped-1").await.unwrap_err();
    assert!(matches!(err, FritzError::HttpError(_)), "{err}");
    assert!(matches!(
        offset_core::ControlError::from(err),
        offset_core::ControlError::Transport(_)
    ));
}
