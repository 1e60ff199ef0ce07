use crate::helpers::{api_path, configuration_for};

use devices_api::{ApiRequest, BlockingDevicesApiClient, ConnectParams, ErrorKind};

use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock server kept alive on its own runtime while the blocking client runs on the test
/// thread.
fn start_server(runtime: &Runtime, status: u16) -> MockServer {
    runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(api_path("/connect")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    })
}

/// **VALUE**: Verifies the blocking facade returns what the async client returns.
///
/// **WHY THIS MATTERS**: Device agents written without async use only this surface.
///
/// **BUG THIS CATCHES**: Would catch the blocking client building its own configuration
/// or swallowing errors.
#[test]
fn given_blocking_client_when_connect_called_then_matches_async_outcome() {
    // GIVEN: A server that accepts connect
    let runtime = Runtime::new().unwrap();
    let server = start_server(&runtime, 200);
    let client = BlockingDevicesApiClient::new(configuration_for(&server)).unwrap();

    // WHEN/THEN: connect succeeds, with http info too
    client.connect(ConnectParams::handshake()).unwrap();
    let response = client
        .connect_with_http_info(ConnectParams::handshake())
        .unwrap();
    assert_eq!(response.status.as_u16(), 200);
}

#[test]
fn given_blocking_client_when_server_rejects_then_returns_api_exception() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(&runtime, 403);
    let client = BlockingDevicesApiClient::new(configuration_for(&server)).unwrap();

    let error = client.connect(ConnectParams::handshake()).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Api);
    assert_eq!(error.status().map(|status| status.as_u16()), Some(403));
}

#[test]
fn given_blocking_client_when_raw_request_executed_then_body_is_returned_undecoded() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(&runtime, 200);
    let client = BlockingDevicesApiClient::new(configuration_for(&server)).unwrap();

    let raw = client.execute_raw(ApiRequest::get("/connect")).unwrap();

    assert!(raw.status.is_success());
    assert!(raw.body.is_empty());
    assert!(client.configuration().base_path().ends_with("/deviceconnect"));
}
