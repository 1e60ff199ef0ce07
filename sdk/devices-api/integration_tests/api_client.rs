use crate::helpers::{DEVICE_TOKEN, api_path, builder_for, configuration_for};

use devices_api::{
    ApiClient, ApiRequest, CancelHandle, Configuration, Credential, DEFAULT_USER_AGENT,
    DEVICE_JWT_AUTH, ErrorKind, ErrorModel, OpenApiError,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Response handling
// ============================================================================

/// **VALUE**: Verifies a 404 surfaces as an API exception with the exact body.
///
/// **WHY THIS MATTERS**: Callers log the raw body and show the server's message; both
/// must survive unchanged.
///
/// **BUG THIS CATCHES**: Would catch non-2xx bodies being decoded as the success type,
/// or the raw text being replaced by a summary.
#[tokio::test]
async fn given_server_returns_404_when_executed_then_api_exception_carries_status_and_body() {
    // GIVEN: A server rejecting the device
    let server = MockServer::start().await;
    let body = r#"{"error":"device not found","request_id":"req-42"}"#;
    Mock::given(method("GET"))
        .and(path(api_path("/devices/d-1")))
        .respond_with(ResponseTemplate::new(404).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();

    // WHEN: Executing
    let error = client
        .execute::<Value>(ApiRequest::get("/devices/{id}").path_param("id", "d-1"))
        .await
        .unwrap_err();

    // THEN: Status, raw body and decoded descriptor are available
    assert_eq!(error.kind(), ErrorKind::Api);
    assert_eq!(error.status().map(|status| status.as_u16()), Some(404));
    let exception = error.api_exception().unwrap();
    assert_eq!(exception.body.as_deref(), Some(body));
    assert_eq!(exception.error_message(), Some("device not found"));
    assert_eq!(
        exception.headers.get("content-type").unwrap(),
        "application/json"
    );
}

/// **VALUE**: Verifies a 2xx response with an unparseable body is a Type error.
///
/// **WHY THIS MATTERS**: The server accepted the request; reporting an API exception would
/// make callers think it was rejected.
///
/// **BUG THIS CATCHES**: Would catch decode failures mapped to ApiException.
#[tokio::test]
async fn given_200_with_invalid_json_when_decoded_as_model_then_returns_type_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/status")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();

    let error = client
        .execute::<ErrorModel>(ApiRequest::get("/status"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Type);
}

#[tokio::test]
async fn given_200_with_model_body_when_executed_with_http_info_then_returns_status_headers_and_data()
 {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/status")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Request-ID", "req-7")
                .set_body_json(json!({"error": "none", "request_id": "req-7", "extra": 1})),
        )
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();

    let response = client
        .execute_with_http_info::<ErrorModel>(ApiRequest::get("/status"))
        .await
        .unwrap();

    assert_eq!(response.status, 200u16);
    assert_eq!(response.headers.get("x-request-id").unwrap(), "req-7");
    assert_eq!(response.data, ErrorModel::new("none").with_request_id("req-7"));
}

#[tokio::test]
async fn given_204_when_executed_as_void_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(api_path("/sessions/s-1")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();

    client
        .execute::<()>(ApiRequest::delete("/sessions/{id}").path_param("id", "s-1"))
        .await
        .unwrap();
}

// ============================================================================
// Request construction
// ============================================================================

/// **VALUE**: Verifies a missing path parameter fails before anything is sent.
///
/// **WHY THIS MATTERS**: Usage errors must be cheap and local; a request that reaches the
/// server with a literal `{id}` can have side effects.
///
/// **BUG THIS CATCHES**: Would catch URL resolution happening after the send.
#[tokio::test]
async fn given_missing_path_param_when_executed_then_value_error_and_no_request_sent() {
    // GIVEN: A mock that must never be hit
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();

    // WHEN: Executing without the parameter
    let error = client
        .execute::<()>(ApiRequest::get("/devices/{id}"))
        .await
        .unwrap_err();

    // THEN: Value error; expect(0) is verified when the server drops
    assert_eq!(error.kind(), ErrorKind::Value);
}

/// **VALUE**: Verifies header precedence: defaults, then auth, then caller headers.
///
/// **WHY THIS MATTERS**: Callers override a default header per call, and the device token
/// is attached automatically unless a caller explicitly supplies one.
///
/// **BUG THIS CATCHES**: Would catch defaults overwriting caller headers or auth missing.
#[tokio::test]
async fn given_default_auth_and_caller_headers_when_executed_then_caller_wins_and_auth_is_sent() {
    // GIVEN: A default header overridden per call
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/status")))
        .and(header("x-trace", "caller"))
        .and(header("x-tenant", "acme"))
        .and(header("authorization", format!("Bearer {DEVICE_TOKEN}").as_str()))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let configuration = builder_for(&server)
        .with_default_header("X-Trace", "default")
        .with_default_header("X-Tenant", "acme")
        .build()
        .unwrap();
    let client = ApiClient::new(Arc::new(configuration)).unwrap();

    // WHEN: Executing with a caller header and DeviceJWT auth
    let result = client
        .execute::<()>(
            ApiRequest::get("/status")
                .header("X-Trace", "caller")
                .auth(DEVICE_JWT_AUTH),
        )
        .await;

    // THEN: The strict mock matched
    assert!(result.is_ok(), "unexpected error: {result:?}");
}

#[tokio::test]
async fn given_caller_authorization_header_when_executed_then_it_replaces_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer override"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();

    client
        .execute::<()>(
            ApiRequest::get("/status")
                .auth(DEVICE_JWT_AUTH)
                .header("Authorization", "Bearer override"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn given_query_api_key_and_query_params_when_executed_then_both_are_in_the_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/sessions")))
        .and(query_param("page", "2"))
        .and(query_param("api_key", "qk"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let configuration = builder_for(&server)
        .with_credential("QueryKey", Credential::api_key_query("api_key", "qk"))
        .build()
        .unwrap();
    let client = ApiClient::new(Arc::new(configuration)).unwrap();

    client
        .execute::<()>(ApiRequest::get("/sessions").query("page", 2).auth("QueryKey"))
        .await
        .unwrap();
}

/// **VALUE**: Verifies model bodies are sent as JSON without read-only fields.
///
/// **WHY THIS MATTERS**: The server rejects bodies with a wrong content type, and unset
/// fields must not be sent as null.
///
/// **BUG THIS CATCHES**: Would catch a missing Content-Type or nulls for unset fields.
#[tokio::test]
async fn given_model_body_when_executed_then_json_body_and_content_type_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("/reports")))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"error": "disk full"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();
    let report = ErrorModel::new("disk full");

    client
        .execute::<()>(ApiRequest::post("/reports").body(&report))
        .await
        .unwrap();
}

/// **VALUE**: Verifies a rotated token is used by the next request.
///
/// **WHY THIS MATTERS**: Device JWTs expire; the application swaps the token on a shared
/// configuration and every client built from it must pick it up.
///
/// **BUG THIS CATCHES**: Would catch clients caching auth headers at construction.
#[tokio::test]
async fn given_token_rotated_between_calls_when_executed_then_new_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer rotated"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let configuration = configuration_for(&server);
    let client = ApiClient::new(Arc::clone(&configuration)).unwrap();

    configuration.rotate_credential(DEVICE_JWT_AUTH, Credential::bearer("rotated"));
    let result = client
        .execute::<()>(ApiRequest::get("/status").auth(DEVICE_JWT_AUTH))
        .await;

    assert!(result.is_ok(), "unexpected error: {result:?}");
}

// ============================================================================
// Transport failures and cancellation
// ============================================================================

/// **VALUE**: Verifies an elapsed timeout is a transport exception with no status.
///
/// **WHY THIS MATTERS**: A slow server must not hang a device agent; the caller must be
/// able to tell "timed out" from "rejected".
///
/// **BUG THIS CATCHES**: Would catch the per-request timeout being ignored.
#[tokio::test]
async fn given_slow_server_when_request_timeout_elapses_then_returns_transport_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();

    let error = client
        .execute::<()>(ApiRequest::get("/status").timeout(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(error.status(), None);
    assert!(error.api_exception().unwrap().is_timeout());
}

#[tokio::test]
async fn given_unreachable_host_when_executed_then_returns_transport_error_without_status() {
    let configuration = Configuration::builder()
        .with_host("http://127.0.0.1:1/api")
        .with_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let client = ApiClient::new(Arc::new(configuration)).unwrap();

    let error = client
        .execute::<()>(ApiRequest::get("/status"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(error.status(), None);
}

/// **VALUE**: Verifies cancellation stops an in-flight request promptly.
///
/// **WHY THIS MATTERS**: Shutdown of a device agent must not wait for the full request
/// timeout.
///
/// **BUG THIS CATCHES**: Would catch the cancel signal only being checked before sending.
#[tokio::test]
async fn given_in_flight_request_when_cancelled_then_returns_cancelled_promptly() {
    // GIVEN: A server that answers after five seconds
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let client = ApiClient::new(configuration_for(&server)).unwrap();
    let handle = CancelHandle::new();
    let signal = handle.signal();

    // WHEN: Cancelling 50ms into the request
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });
    let started = Instant::now();
    let error = client
        .execute::<()>(ApiRequest::get("/status").cancel_on(signal))
        .await
        .unwrap_err();

    // THEN: Cancelled well before the server would answer
    assert!(matches!(error, OpenApiError::Cancelled { .. }));
    assert!(started.elapsed() < Duration::from_secs(2));
}
