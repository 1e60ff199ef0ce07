use crate::helpers::{DEVICE_TOKEN, api_path, configuration_for};

use devices_api::{ConnectParams, DevicesApiClient, ErrorKind};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// connect() - GET /connect with the upgrade headers
// ============================================================================

/// **VALUE**: Verifies `connect` sends the handshake headers and the device token.
///
/// **WHY THIS MATTERS**: The server authenticates the device from the JWT and only
/// upgrades with the full header set.
///
/// **BUG THIS CATCHES**: Would catch a header dropped between params and the wire, or
/// DeviceJWT auth missing from the operation.
#[tokio::test]
async fn given_handshake_params_when_connect_called_then_headers_and_token_are_sent() {
    // GIVEN: A server accepting only a complete handshake request
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/connect")))
        .and(header("upgrade", "websocket"))
        .and(header("sec-websocket-version", "13"))
        .and(header_exists("sec-websocket-key"))
        .and(header("authorization", format!("Bearer {DEVICE_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = DevicesApiClient::new(configuration_for(&server)).unwrap();

    // WHEN: Calling connect
    let result = client.connect(ConnectParams::handshake()).await;

    // THEN: The strict mock matched
    assert!(result.is_ok(), "unexpected error: {result:?}");
}

#[tokio::test]
async fn given_success_when_connect_with_http_info_called_then_status_and_headers_are_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/connect")))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Session-ID", "s-9"))
        .mount(&server)
        .await;
    let client = DevicesApiClient::new(configuration_for(&server)).unwrap();

    let response = client
        .connect_with_http_info(ConnectParams::handshake())
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.headers.get("x-session-id").unwrap(), "s-9");
}

/// **VALUE**: Verifies a 401 from connect carries the server's error descriptor.
///
/// **WHY THIS MATTERS**: An expired device token must be distinguishable from other
/// failures so the agent can re-authenticate.
///
/// **BUG THIS CATCHES**: Would catch the descriptor being lost or the status dropped.
#[tokio::test]
async fn given_unauthorized_device_when_connect_called_then_api_exception_has_descriptor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/connect")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": "token expired", "request_id": "r-1"})),
        )
        .mount(&server)
        .await;
    let client = DevicesApiClient::new(configuration_for(&server)).unwrap();

    let error = client
        .connect(ConnectParams::handshake())
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Api);
    let exception = error.api_exception().unwrap();
    assert_eq!(exception.status.map(|status| status.as_u16()), Some(401));
    assert_eq!(exception.error_message(), Some("token expired"));
    assert_eq!(
        exception.error.as_ref().and_then(|e| e.request_id.as_deref()),
        Some("r-1")
    );
}

#[tokio::test]
async fn given_missing_websocket_key_when_connect_called_then_value_error_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = DevicesApiClient::new(configuration_for(&server)).unwrap();
    let params = ConnectParams {
        sec_websocket_key: None,
        ..ConnectParams::handshake()
    };

    let error = client.connect(params).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Value);
    assert!(error.to_string().contains("`sec_websocket_key`"));
}

#[tokio::test]
async fn given_request_timeout_in_params_when_server_is_slow_then_connect_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let client = DevicesApiClient::new(configuration_for(&server)).unwrap();

    let error = client
        .connect(ConnectParams::handshake().with_request_timeout(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
}
