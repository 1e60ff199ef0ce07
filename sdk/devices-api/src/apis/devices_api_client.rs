//! Device-facing operations of the Device Connect API.

use crate::DEVICE_JWT_AUTH;
use crate::api_client::{ApiClient, ApiRequest, ApiResponse, CancelSignal};
use crate::configuration::Configuration;
use crate::error::{ApiException, OpenApiError, TransportFailure};

use common::HttpStatusCode;

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::generate_key;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub const CONNECT_PATH: &str = "/connect";

const CONNECTION_HEADER: &str = "Connection";
const UPGRADE_HEADER: &str = "Upgrade";
const SEC_WEBSOCKET_KEY_HEADER: &str = "Sec-WebSocket-Key";
const SEC_WEBSOCKET_VERSION_HEADER: &str = "Sec-WebSocket-Version";

const CONNECTION_ALLOWED: &[&str] = &["Upgrade"];
const UPGRADE_ALLOWED: &[&str] = &["websocket"];
const WEBSOCKET_VERSION_ALLOWED: &[i32] = &[13];

/// Live device connection after a successful upgrade.
pub type DeviceStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Parameters of the `connect` operation. All four headers are required.
#[derive(Debug, Clone, Default)]
pub struct ConnectParams {
    pub connection: Option<String>,
    pub upgrade: Option<String>,
    pub sec_websocket_key: Option<String>,
    pub sec_websocket_version: Option<i32>,
    pub request_timeout: Option<Duration>,
    pub cancel: Option<CancelSignal>,
}

impl ConnectParams {
    /// Upgrade headers for a fresh WebSocket handshake.
    pub fn handshake() -> Self {
        Self {
            connection: Some(CONNECTION_ALLOWED[0].to_string()),
            upgrade: Some(UPGRADE_ALLOWED[0].to_string()),
            sec_websocket_key: Some(generate_key()),
            sec_websocket_version: Some(WEBSOCKET_VERSION_ALLOWED[0]),
            request_timeout: None,
            cancel: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    #[track_caller]
    pub(crate) fn into_request(self) -> Result<ApiRequest, OpenApiError> {
        let connection = required(self.connection, "connection")?;
        let upgrade = required(self.upgrade, "upgrade")?;
        let key = required(self.sec_websocket_key, "sec_websocket_key")?;
        let version = required(self.sec_websocket_version, "sec_websocket_version")?;

        allowed(&connection.as_str(), CONNECTION_ALLOWED, "connection")?;
        allowed(&upgrade.as_str(), UPGRADE_ALLOWED, "upgrade")?;
        allowed(&version, WEBSOCKET_VERSION_ALLOWED, "sec_websocket_version")?;
        if key.is_empty() {
            return Err(OpenApiError::value_error(
                "Invalid value for `sec_websocket_key`, must not be empty",
            ));
        }

        let mut request = ApiRequest::get(CONNECT_PATH)
            .header(CONNECTION_HEADER, connection)
            .header(UPGRADE_HEADER, upgrade)
            .header(SEC_WEBSOCKET_KEY_HEADER, key)
            .header(SEC_WEBSOCKET_VERSION_HEADER, version)
            .auth(DEVICE_JWT_AUTH);

        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        if let Some(signal) = self.cancel {
            request = request.cancel_on(signal);
        }

        Ok(request)
    }
}

/// Client for the device-facing Device Connect operations.
#[derive(Clone)]
pub struct DevicesApiClient {
    api_client: ApiClient,
}

impl DevicesApiClient {
    pub fn new(configuration: Arc<Configuration>) -> Result<Self, OpenApiError> {
        Ok(Self {
            api_client: ApiClient::new(configuration)?,
        })
    }

    pub fn from_api_client(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    pub fn api_client(&self) -> &ApiClient {
        &self.api_client
    }

    /// Establish a websocket connection with the server.
    ///
    /// Sends `GET /connect` with the upgrade headers. The server answers
    /// `101 Switching Protocols`, which is outside 200-299 and so surfaces as
    /// [`ApiException`] with status 101; use [`open_stream`](Self::open_stream)
    /// for a usable connection.
    pub async fn connect(&self, params: ConnectParams) -> Result<(), OpenApiError> {
        Ok(self.connect_with_http_info(params).await?.data)
    }

    pub async fn connect_with_http_info(
        &self,
        params: ConnectParams,
    ) -> Result<ApiResponse<()>, OpenApiError> {
        let request = params.into_request()?;
        self.api_client.execute_with_http_info(request).await
    }

    /// Perform the upgrade handshake and return the open device stream.
    ///
    /// Uses the configured host (`http`→`ws`, `https`→`wss`), default headers,
    /// `DeviceJWT` credentials and timeout. TLS certificates are always
    /// verified for the stream.
    pub async fn open_stream(&self) -> Result<DeviceStream, OpenApiError> {
        let configuration = self.api_client.configuration();
        let auth = configuration.auth_params(&[DEVICE_JWT_AUTH])?;

        let mut url =
            ApiRequest::get(CONNECT_PATH).resolve_url(configuration.host(), &auth.query)?;
        let ws_scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(ws_scheme).map_err(|_| {
            OpenApiError::value_error(format!("Cannot derive websocket URL from {url}"))
        })?;

        let mut request = url.as_str().into_client_request().map_err(|e| {
            OpenApiError::value_error(format!("Invalid websocket request: {e}"))
        })?;
        for (name, value) in configuration.default_headers() {
            request.headers_mut().insert(name.clone(), value.clone());
        }
        for (name, value) in auth.headers {
            request.headers_mut().insert(name, value);
        }

        debug!("Opening device stream at {url}");

        let handshake =
            tokio::time::timeout(configuration.timeout(), connect_async(request)).await;
        match handshake {
            Ok(Ok((stream, response))) => {
                debug!("Device stream open, status {}", response.status());
                Ok(stream)
            }
            Ok(Err(error)) => Err(handshake_error(error)),
            Err(_) => Err(OpenApiError::transport(
                TransportFailure::Timeout,
                format!(
                    "websocket handshake did not complete within {:?}",
                    configuration.timeout()
                ),
            )),
        }
    }
}

#[track_caller]
fn handshake_error(error: WsError) -> OpenApiError {
    match error {
        WsError::Http(response) => {
            let status = HttpStatusCode(response.status().as_u16());
            let reason = response.status().canonical_reason().map(str::to_string);
            let body: &[u8] = response.body().as_deref().unwrap_or_default();
            ApiException::from_response(status, reason, response.headers().clone(), body).into()
        }
        WsError::Io(io) => OpenApiError::transport(TransportFailure::Connect, io.to_string()),
        WsError::Tls(tls) => OpenApiError::transport(TransportFailure::Connect, tls.to_string()),
        other => OpenApiError::transport(TransportFailure::Request, other.to_string()),
    }
}

#[track_caller]
fn required<T>(value: Option<T>, name: &str) -> Result<T, OpenApiError> {
    value.ok_or_else(|| {
        OpenApiError::value_error(format!(
            "Missing the required parameter `{name}` when calling `connect`"
        ))
    })
}

#[track_caller]
fn allowed<T>(value: &T, allowed: &[T], name: &str) -> Result<(), OpenApiError>
where
    T: PartialEq + std::fmt::Debug,
{
    if allowed.contains(value) {
        Ok(())
    } else {
        Err(OpenApiError::value_error(format!(
            "Invalid value for `{name}` ({value:?}), must be one of {allowed:?}"
        )))
    }
}
