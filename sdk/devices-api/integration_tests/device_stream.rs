use crate::helpers::{DEVICE_TOKEN, api_path, configuration_for};

use devices_api::{Configuration, DevicesApiClient, ErrorKind};

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// What the server saw during the upgrade.
struct SeenHandshake {
    path: String,
    authorization: Option<String>,
}

/// **VALUE**: Verifies `open_stream` upgrades against `/connect` with the device token and
/// yields a working stream.
///
/// **WHY THIS MATTERS**: This is the one operation a device agent actually needs; the
/// connection carries every remote terminal and file transfer session.
///
/// **BUG THIS CATCHES**: Would catch a wrong ws path, a missing Authorization header, or
/// the http->ws scheme mapping breaking.
#[tokio::test]
async fn given_websocket_server_when_stream_opened_then_upgrade_is_authenticated_and_usable() {
    // GIVEN: A websocket server that records the handshake and greets the device
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = oneshot::channel::<SeenHandshake>();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let callback = move |request: &Request,
                             response: Response|
              -> Result<Response, ErrorResponse> {
            let authorization = request
                .headers()
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let _ = seen_tx.send(SeenHandshake {
                path: request.uri().path().to_string(),
                authorization,
            });
            Ok(response)
        };
        let mut websocket = accept_hdr_async(socket, callback).await.unwrap();
        websocket.send(Message::text("hello-device")).await.unwrap();
    });

    let configuration = Configuration::builder()
        .with_host(format!("http://{address}/api/devices/v1/deviceconnect"))
        .with_device_token(DEVICE_TOKEN)
        .build()
        .unwrap();
    let client = DevicesApiClient::new(Arc::new(configuration)).unwrap();

    // WHEN: Opening the stream and reading the first frame
    let mut stream = client.open_stream().await.unwrap();
    let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    // THEN: Upgrade hit /connect with the token, and the stream carries messages
    let seen = seen_rx.await.unwrap();
    assert_eq!(seen.path, api_path("/connect"));
    assert_eq!(
        seen.authorization.as_deref(),
        Some(format!("Bearer {DEVICE_TOKEN}").as_str())
    );
    assert_eq!(first, Message::text("hello-device"));
}

/// **VALUE**: Verifies a refused upgrade surfaces as an API exception with the status.
///
/// **WHY THIS MATTERS**: An unaccepted device gets 401 on the upgrade; the agent must see
/// the same error shape as for any other rejected call.
///
/// **BUG THIS CATCHES**: Would catch handshake HTTP errors reported as transport errors.
#[tokio::test]
async fn given_server_rejects_upgrade_when_stream_opened_then_api_exception_has_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/connect")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .mount(&server)
        .await;
    let client = DevicesApiClient::new(configuration_for(&server)).unwrap();

    let error = client.open_stream().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Api);
    assert_eq!(error.status().map(|status| status.as_u16()), Some(401));
}

#[tokio::test]
async fn given_unreachable_host_when_stream_opened_then_returns_transport_error() {
    let configuration = Configuration::builder()
        .with_host("http://127.0.0.1:1/api/devices/v1/deviceconnect")
        .with_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let client = DevicesApiClient::new(Arc::new(configuration)).unwrap();

    let error = client.open_stream().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
}
