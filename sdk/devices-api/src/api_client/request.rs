use super::cancel::CancelSignal;
use crate::codec::IntoRequestBody;
use crate::error::OpenApiError;

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use url::Url;

/// Generic shape of one API call, filled in by an operation method.
///
/// ```ignore
/// let request = ApiRequest::new(Method::GET, "/devices/{id}")
///     .path_param("id", device_id)
///     .header("X-Request-ID", request_id)
///     .auth(DEVICE_JWT_AUTH);
/// ```
#[derive(Debug)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path_template: String,
    pub(crate) path_params: BTreeMap<String, String>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) header_params: Vec<(String, String)>,
    pub(crate) body: Option<Result<Value, OpenApiError>>,
    pub(crate) auth_settings: Vec<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) cancel: Option<CancelSignal>,
}

impl ApiRequest {
    pub fn new(method: Method, path_template: impl Into<String>) -> Self {
        Self {
            method,
            path_template: path_template.into(),
            path_params: BTreeMap::new(),
            query_params: Vec::new(),
            header_params: Vec::new(),
            body: None,
            auth_settings: Vec::new(),
            timeout: None,
            cancel: None,
        }
    }

    pub fn get(path_template: impl Into<String>) -> Self {
        Self::new(Method::GET, path_template)
    }

    pub fn post(path_template: impl Into<String>) -> Self {
        Self::new(Method::POST, path_template)
    }

    pub fn put(path_template: impl Into<String>) -> Self {
        Self::new(Method::PUT, path_template)
    }

    pub fn delete(path_template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path_template)
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.insert(name.into(), value.to_string());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((name.into(), value.to_string()));
        self
    }

    /// Caller header; wins over default and auth headers with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.header_params.push((name.into(), value.to_string()));
        self
    }

    /// JSON body. Models are serialized (read-only fields dropped); JSON
    /// values pass through. A serialization failure surfaces from `execute`.
    pub fn body(mut self, body: impl IntoRequestBody) -> Self {
        self.body = Some(body.into_request_body());
        self
    }

    /// Name of a security scheme this operation requires.
    pub fn auth(mut self, scheme: impl Into<String>) -> Self {
        self.auth_settings.push(scheme.into());
        self
    }

    /// Override the configured timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_on(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    /// Append the substituted template to `base`, then the query pairs.
    ///
    /// Every `{name}` placeholder must have a path parameter; values are
    /// percent-encoded as single path segments. A segment that resolves to
    /// `.` or `..` is rejected.
    #[track_caller]
    pub(crate) fn resolve_url(
        &self,
        base: &Url,
        extra_query: &[(String, String)],
    ) -> Result<Url, OpenApiError> {
        let mut segments = Vec::new();
        for raw in self.path_template.split('/').filter(|raw| !raw.is_empty()) {
            let segment = substitute(raw, &self.path_params)?;
            // `url` drops dot segments instead of encoding them.
            if segment == "." || segment == ".." {
                return Err(OpenApiError::value_error(format!(
                    "Path segment '{raw}' resolves to '{segment}', which would change the endpoint"
                )));
            }
            segments.push(segment);
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| OpenApiError::value_error(format!("Host cannot be a base URL: {base}")))?
            .pop_if_empty()
            .extend(segments.iter());

        if !self.query_params.is_empty() || !extra_query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query_params.iter().chain(extra_query.iter()));
        }

        Ok(url)
    }
}

#[track_caller]
fn substitute(segment: &str, params: &BTreeMap<String, String>) -> Result<String, OpenApiError> {
    let mut resolved = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
            break;
        };
        let name = &rest[open + 1..close];
        let value = params.get(name).ok_or_else(|| {
            OpenApiError::value_error(format!("Missing the required parameter '{name}'"))
        })?;
        resolved.push_str(&rest[..open]);
        resolved.push_str(value);
        rest = &rest[close + 1..];
    }

    resolved.push_str(rest);
    Ok(resolved)
}
