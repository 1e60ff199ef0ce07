//! Credentials for the API's security schemes.

use crate::error::OpenApiError;

use common::RedactedSecret;

use std::collections::BTreeMap;

use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Header,
    Query,
}

/// Material for one named security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`, used by `DeviceJWT`.
    Bearer { token: RedactedSecret },

    /// API key sent as `<name>: [<prefix> ]<key>` or `?<name>=[<prefix> ]<key>`.
    ApiKey {
        name: String,
        location: ApiKeyLocation,
        key: RedactedSecret,
        prefix: Option<String>,
    },
}

impl Credential {
    pub fn bearer(token: impl Into<RedactedSecret>) -> Self {
        Credential::Bearer {
            token: token.into(),
        }
    }

    pub fn api_key_header(name: impl Into<String>, key: impl Into<RedactedSecret>) -> Self {
        Credential::ApiKey {
            name: name.into(),
            location: ApiKeyLocation::Header,
            key: key.into(),
            prefix: None,
        }
    }

    pub fn api_key_query(name: impl Into<String>, key: impl Into<RedactedSecret>) -> Self {
        Credential::ApiKey {
            name: name.into(),
            location: ApiKeyLocation::Query,
            key: key.into(),
            prefix: None,
        }
    }

    /// Prefix placed before an API key, e.g. `Token`.
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        match self {
            Credential::ApiKey {
                name,
                location,
                key,
                ..
            } => Credential::ApiKey {
                name,
                location,
                key,
                prefix: Some(prefix.into()),
            },
            bearer => bearer,
        }
    }

    /// Token or key material, whichever this credential carries.
    pub fn secret(&self) -> &RedactedSecret {
        match self {
            Credential::Bearer { token } => token,
            Credential::ApiKey { key, .. } => key,
        }
    }

    fn rendered_value(&self) -> String {
        match self {
            Credential::Bearer { token } => format!("Bearer {}", token.expose()),
            Credential::ApiKey {
                key,
                prefix: Some(prefix),
                ..
            } => format!("{prefix} {}", key.expose()),
            Credential::ApiKey { key, .. } => key.expose().to_string(),
        }
    }
}

/// Scheme name to credential. Swapped as a whole on rotation.
pub type CredentialSet = BTreeMap<String, Credential>;

/// Headers and query pairs computed from one credential snapshot.
#[derive(Debug, Default)]
pub struct AuthParams {
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub query: Vec<(String, String)>,
}

impl AuthParams {
    /// Apply the requested schemes from `credentials`; schemes without a
    /// credential contribute nothing.
    #[track_caller]
    pub fn from_credentials(
        credentials: &CredentialSet,
        schemes: &[&str],
    ) -> Result<Self, OpenApiError> {
        let mut params = AuthParams::default();

        for scheme in schemes {
            let Some(credential) = credentials.get(*scheme) else {
                continue;
            };

            let rendered = credential.rendered_value();
            match credential {
                Credential::Bearer { .. } => {
                    params.headers.push((AUTHORIZATION, sensitive_value(scheme, &rendered)?));
                }
                Credential::ApiKey {
                    name,
                    location: ApiKeyLocation::Header,
                    ..
                } => {
                    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                        OpenApiError::value_error(format!(
                            "invalid API key header name '{name}' for scheme '{scheme}'"
                        ))
                    })?;
                    params
                        .headers
                        .push((header_name, sensitive_value(scheme, &rendered)?));
                }
                Credential::ApiKey {
                    name,
                    location: ApiKeyLocation::Query,
                    ..
                } => params.query.push((name.clone(), rendered)),
            }
        }

        Ok(params)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.query.is_empty()
    }
}

#[track_caller]
fn sensitive_value(scheme: &str, rendered: &str) -> Result<HeaderValue, OpenApiError> {
    let mut value = HeaderValue::from_str(rendered).map_err(|_| {
        OpenApiError::value_error(format!(
            "credential for scheme '{scheme}' is not a valid header value"
        ))
    })?;
    value.set_sensitive(true);
    Ok(value)
}
