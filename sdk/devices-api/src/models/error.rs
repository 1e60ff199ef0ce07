use crate::codec::{FieldKind, FieldSpec, Model, ModelSpec};

use serde::{Deserialize, Serialize};

const ERROR_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("error", FieldKind::String),
    FieldSpec::optional("request_id", FieldKind::String),
];

/// Error descriptor the API returns with 4xx and 5xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Error {
    /// Description of the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Request ID, as sent by the client or generated by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Error {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl Model for Error {
    const SPEC: ModelSpec = ModelSpec::new("Error", ERROR_FIELDS);
}
