//! Error taxonomy for the Device Connect client.
//!
//! [`OpenApiError`] is the one type every fallible SDK call returns, so a
//! caller can handle any failure uniformly. Callers who care about the cause
//! match on the variant (or on [`OpenApiError::kind`]):
//!
//! - `Type`, `Value`, `Key`: usage errors, detected before or after the wire
//! - `Api`: the server rejected the request, or the transport failed
//! - `Cancelled`: the caller cancelled an in-flight call
//!
//! Nothing here is retried or logged; errors surface where they are raised.

pub mod api_exception;
pub mod logging;
pub mod path;

pub use api_exception::{ApiException, TransportFailure};
pub use logging::LoggingError;
pub use path::{ItemPath, PathItem};

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

/// Discriminant of [`OpenApiError`], splitting the transport case out of `Api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Value,
    Key,
    Api,
    Transport,
    Cancelled,
}

#[derive(Debug, ThisError)]
pub enum OpenApiError {
    /// A value does not have the type its declaration requires.
    #[error("Api Type Error: {message}{path} {location}")]
    Type {
        message: String,
        path: ItemPath,
        location: ErrorLocation,
    },

    /// A value has the right type but violates a constraint.
    #[error("Api Value Error: {message}{path} {location}")]
    Value {
        message: String,
        path: ItemPath,
        location: ErrorLocation,
    },

    /// A required field is missing from a decoded object.
    #[error("Api Key Error: {message}{path} {location}")]
    Key {
        message: String,
        path: ItemPath,
        location: ErrorLocation,
    },

    #[error("Api Exception: {0}")]
    Api(Box<ApiException>),

    #[error("Cancelled Error: {message} {location}")]
    Cancelled {
        message: String,
        location: ErrorLocation,
    },
}

impl OpenApiError {
    #[track_caller]
    pub fn type_error(message: impl Into<String>, path: ItemPath) -> Self {
        OpenApiError::Type {
            message: message.into(),
            path,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::value_error_at(message, ItemPath::root())
    }

    #[track_caller]
    pub fn value_error_at(message: impl Into<String>, path: ItemPath) -> Self {
        OpenApiError::Value {
            message: message.into(),
            path,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn key_error(message: impl Into<String>, path: ItemPath) -> Self {
        OpenApiError::Key {
            message: message.into(),
            path,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport(failure: TransportFailure, message: impl Into<String>) -> Self {
        OpenApiError::Api(Box::new(ApiException::transport(failure, message)))
    }

    #[track_caller]
    pub fn cancelled() -> Self {
        OpenApiError::Cancelled {
            message: String::from("request cancelled by caller"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OpenApiError::Type { .. } => ErrorKind::Type,
            OpenApiError::Value { .. } => ErrorKind::Value,
            OpenApiError::Key { .. } => ErrorKind::Key,
            OpenApiError::Api(exception) if exception.is_transport() => ErrorKind::Transport,
            OpenApiError::Api(_) => ErrorKind::Api,
            OpenApiError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// True for the usage errors (`Type`, `Value`, `Key`).
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Type | ErrorKind::Value | ErrorKind::Key
        )
    }

    pub fn api_exception(&self) -> Option<&ApiException> {
        match self {
            OpenApiError::Api(exception) => Some(exception),
            _ => None,
        }
    }

    /// HTTP status of a server-side rejection, `None` for every other case.
    pub fn status(&self) -> Option<HttpStatusCode> {
        self.api_exception().and_then(|exception| exception.status)
    }

    pub fn location(&self) -> ErrorLocation {
        match self {
            OpenApiError::Type { location, .. }
            | OpenApiError::Value { location, .. }
            | OpenApiError::Key { location, .. }
            | OpenApiError::Cancelled { location, .. } => *location,
            OpenApiError::Api(exception) => exception.location,
        }
    }
}

impl From<ApiException> for OpenApiError {
    fn from(exception: ApiException) -> Self {
        OpenApiError::Api(Box::new(exception))
    }
}

impl From<reqwest::Error> for OpenApiError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        let failure = if error.is_timeout() {
            TransportFailure::Timeout
        } else if error.is_connect() {
            TransportFailure::Connect
        } else {
            TransportFailure::Request
        };
        OpenApiError::transport(failure, error.to_string())
    }
}

impl From<url::ParseError> for OpenApiError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        OpenApiError::value_error(format!("invalid URL: {error}"))
    }
}
