use crate::codec;
use crate::models;

use common::{ErrorLocation, HttpStatusCode};

use std::fmt::{Display, Formatter, Result as FormatResult};

use reqwest::header::HeaderMap;

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// Connection refused, DNS failure, TLS handshake failure.
    Connect,
    /// The configured timeout elapsed.
    Timeout,
    /// Any other failure while sending the request or reading the body.
    Request,
}

impl Display for TransportFailure {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let label = match self {
            TransportFailure::Connect => "connect",
            TransportFailure::Timeout => "timeout",
            TransportFailure::Request => "request",
        };
        formatter.write_str(label)
    }
}

/// A remote outcome the caller has to deal with.
///
/// Either the server answered outside 200-299 (`status` is set), or the
/// exchange failed before any response arrived (`transport` is set and
/// `status` is `None`).
#[derive(Debug, Clone)]
pub struct ApiException {
    pub status: Option<HttpStatusCode>,
    pub reason: Option<String>,
    pub body: Option<String>,
    pub headers: HeaderMap,
    /// The body decoded as the API's error descriptor, when it parses as one.
    pub error: Option<models::Error>,
    pub transport: Option<TransportFailure>,
    pub location: ErrorLocation,
}

impl ApiException {
    /// Build from a non-success HTTP response.
    #[track_caller]
    pub fn from_response(
        status: HttpStatusCode,
        reason: Option<String>,
        headers: HeaderMap,
        body: &[u8],
    ) -> Self {
        let error = codec::deserialize_slice::<models::Error>(body).ok();
        let body = String::from_utf8_lossy(body).into_owned();

        Self {
            status: Some(status),
            reason,
            body: Some(body),
            headers,
            error,
            transport: None,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }

    /// Build the transport-error variant: no status, no body.
    #[track_caller]
    pub fn transport(failure: TransportFailure, message: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: Some(message.into()),
            body: None,
            headers: HeaderMap::new(),
            error: None,
            transport: Some(failure),
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }

    pub fn is_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub fn is_timeout(&self) -> bool {
        self.transport == Some(TransportFailure::Timeout)
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_some_and(|status| status.is_client_error())
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_some_and(|status| status.is_server_error())
    }

    /// Message from the decoded error descriptor, if the server sent one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().and_then(|error| error.error.as_deref())
    }
}

impl Display for ApiException {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match (self.status, self.transport) {
            (Some(status), _) => write!(formatter, "({status})")?,
            (None, Some(failure)) => write!(formatter, "(transport: {failure})")?,
            (None, None) => write!(formatter, "(no status)")?,
        }
        if let Some(reason) = &self.reason {
            write!(formatter, "\nReason: {reason}")?;
        }
        if !self.headers.is_empty() {
            write!(formatter, "\nHTTP response headers: {:?}", self.headers)?;
        }
        if let Some(body) = &self.body {
            write!(formatter, "\nHTTP response body: {body}")?;
        }
        write!(formatter, "\n{}", self.location)
    }
}
