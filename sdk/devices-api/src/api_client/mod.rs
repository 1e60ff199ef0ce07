//! Generic request executor every operation goes through.
//!
//! # Flow
//!
//! 1. Resolve the URL: path template + percent-encoded path params + query
//! 2. Merge headers: configuration defaults < auth < caller headers
//! 3. Send with the configured (or per-request) timeout and TLS policy
//! 4. 2xx: decode into the declared response type; otherwise [`ApiException`]
//!
//! Transport failures become the transport variant of [`ApiException`];
//! decode failures of a 2xx response are codec errors, never `ApiException`.
//! Nothing is retried.

pub mod cancel;
pub mod request;
pub mod response;

pub use cancel::{CancelHandle, CancelSignal};
pub use request::ApiRequest;
pub use response::{ApiResponse, RawResponse};

use crate::codec::ResponseType;
use crate::configuration::Configuration;
use crate::error::{ApiException, ItemPath, OpenApiError};

use std::sync::Arc;

use log::debug;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP transport bound to one shared [`Configuration`].
///
/// Cheap to clone; clones share the connection pool and the configuration.
#[derive(Clone)]
pub struct ApiClient {
    configuration: Arc<Configuration>,
    http: Client,
}

impl ApiClient {
    pub fn new(configuration: Arc<Configuration>) -> Result<Self, OpenApiError> {
        let http = Client::builder()
            .timeout(configuration.timeout())
            .danger_accept_invalid_certs(!configuration.verify_tls())
            .build()?;

        Ok(Self {
            configuration,
            http,
        })
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    /// Execute and decode the body into `T`. Use `()` for operations without
    /// a response body.
    pub async fn execute<T: ResponseType>(&self, request: ApiRequest) -> Result<T, OpenApiError> {
        Ok(self.execute_with_http_info(request).await?.data)
    }

    /// Like [`execute`](Self::execute) but keeps status and headers.
    pub async fn execute_with_http_info<T: ResponseType>(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse<T>, OpenApiError> {
        let raw = self.execute_raw(request).await?;
        let data = T::decode(&raw.body)?;

        Ok(ApiResponse {
            status: raw.status,
            headers: raw.headers,
            data,
        })
    }

    /// Execute without decoding. Non-2xx statuses still fail.
    pub async fn execute_raw(&self, request: ApiRequest) -> Result<RawResponse, OpenApiError> {
        let raw = self.send(request).await?;

        if !raw.status.is_success() {
            let exception =
                ApiException::from_response(raw.status, raw.reason, raw.headers, &raw.body);
            return Err(exception.into());
        }

        Ok(raw)
    }

    async fn send(&self, request: ApiRequest) -> Result<RawResponse, OpenApiError> {
        let cancel = request.cancel.clone();
        let prepared = self.build_request(request)?;

        debug!("{} {}", prepared.method(), prepared.url());

        let exchange = async {
            let response = self.http.execute(prepared).await?;
            let raw = RawResponse::read(response).await?;
            debug!("Response status {}", raw.status);
            Ok::<RawResponse, OpenApiError>(raw)
        };

        match cancel {
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => Err(OpenApiError::cancelled()),
                    result = exchange => result,
                }
            }
            None => exchange.await,
        }
    }

    /// Everything up to the network call; fails without touching the wire.
    fn build_request(&self, request: ApiRequest) -> Result<reqwest::Request, OpenApiError> {
        let schemes: Vec<&str> = request.auth_settings.iter().map(String::as_str).collect();
        let auth = self.configuration.auth_params(&schemes)?;

        let url = request.resolve_url(self.configuration.host(), &auth.query)?;
        let body = request.body.transpose()?;

        let mut headers = self.configuration.default_headers().clone();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        for (name, value) in auth.headers {
            headers.insert(name, value);
        }
        merge_caller_headers(&mut headers, &request.header_params)?;

        let mut builder = self
            .http
            .request(request.method, url)
            .headers(headers)
            .timeout(request.timeout.unwrap_or(self.configuration.timeout()));

        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body).map_err(|e| {
                OpenApiError::type_error(
                    format!("cannot encode request body: {e}"),
                    ItemPath::root(),
                )
            })?;
            builder = builder.body(bytes);
        }

        Ok(builder.build()?)
    }
}

#[track_caller]
fn merge_caller_headers(
    headers: &mut HeaderMap,
    params: &[(String, String)],
) -> Result<(), OpenApiError> {
    for (name, value) in params {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| OpenApiError::value_error(format!("Invalid header name: {name}")))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            OpenApiError::value_error(format!("Invalid value for header '{name}'"))
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(())
}
