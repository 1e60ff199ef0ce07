//! Connection settings shared by every client built from them.
//!
//! A [`Configuration`] is built once, wrapped in an `Arc` and handed to each
//! client explicitly. Everything is immutable after [`ConfigurationBuilder::build`]
//! except the credentials, which can be rotated while requests are in flight.
//!
//! # Credential rotation
//!
//! The credential set lives behind `RwLock<Arc<CredentialSet>>`. Readers
//! clone the `Arc` under the read lock and compute headers from that snapshot;
//! writers build a complete new set and swap it under the write lock. A
//! request therefore sees all of the old credentials or all of the new ones.

pub mod credentials;
pub mod env;

pub use credentials::{ApiKeyLocation, AuthParams, Credential, CredentialSet};

use crate::error::OpenApiError;
use crate::{DEFAULT_HOST, DEFAULT_USER_AGENT, DEVICE_JWT_AUTH};

use common::RedactedSecret;

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Configuration {
    host: Url,
    default_headers: HeaderMap,
    timeout: Duration,
    verify_tls: bool,
    credentials: RwLock<Arc<CredentialSet>>,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Base URL every operation path is appended to.
    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn base_path(&self) -> &str {
        self.host.as_str()
    }

    /// Headers sent with every request, `User-Agent` included.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.default_headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// Current credential set. The returned snapshot never changes.
    pub fn credentials(&self) -> Arc<CredentialSet> {
        let guard = self
            .credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn credential(&self, scheme: &str) -> Option<Credential> {
        self.credentials().get(scheme).cloned()
    }

    /// Auth headers and query pairs for the given schemes, from one snapshot.
    #[track_caller]
    pub fn auth_params(&self, schemes: &[&str]) -> Result<AuthParams, OpenApiError> {
        AuthParams::from_credentials(&self.credentials(), schemes)
    }

    /// Replace the credential of one scheme, keeping the others.
    pub fn rotate_credential(&self, scheme: impl Into<String>, credential: Credential) {
        let scheme = scheme.into();
        self.update_credentials(|set| {
            set.insert(scheme.clone(), credential);
        });
        debug!("Credential rotated for scheme {scheme}");
    }

    /// Swap in a complete new credential set.
    pub fn replace_credentials(&self, credentials: CredentialSet) {
        let mut guard = self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(credentials);
    }

    pub fn clear_credential(&self, scheme: &str) {
        self.update_credentials(|set| {
            set.remove(scheme);
        });
    }

    fn update_credentials(&self, change: impl FnOnce(&mut CredentialSet)) {
        let mut guard = self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = CredentialSet::clone(&guard);
        change(&mut next);
        *guard = Arc::new(next);
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schemes: Vec<String> = self.credentials().keys().cloned().collect();
        f.debug_struct("Configuration")
            .field("host", &self.host.as_str())
            .field("default_headers", &self.default_headers)
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .field("credential_schemes", &schemes)
            .finish()
    }
}

/// Builder for validated [`Configuration`] instances.
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    host: Option<String>,
    default_headers: Vec<(String, String)>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    verify_tls: Option<bool>,
    credentials: CredentialSet,
}

impl ConfigurationBuilder {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = Some(verify_tls);
        self
    }

    pub fn with_credential(mut self, scheme: impl Into<String>, credential: Credential) -> Self {
        self.credentials.insert(scheme.into(), credential);
        self
    }

    /// Shorthand for the `DeviceJWT` bearer scheme.
    pub fn with_device_token(self, token: impl Into<String>) -> Self {
        self.with_credential(DEVICE_JWT_AUTH, Credential::bearer(RedactedSecret::new(token)))
    }

    /// Build the configuration with validation.
    #[track_caller]
    pub fn build(self) -> Result<Configuration, OpenApiError> {
        let host_str = self.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = Url::parse(&host_str)?;

        if host.scheme() != "http" && host.scheme() != "https" {
            return Err(OpenApiError::value_error(format!(
                "Invalid host scheme '{}': expected http or https",
                host.scheme()
            )));
        }

        if host.cannot_be_a_base() {
            return Err(OpenApiError::value_error(format!(
                "Host cannot be used as a base URL: {host_str}"
            )));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(OpenApiError::value_error("Timeout must be non-zero"));
        }

        for (scheme, credential) in &self.credentials {
            if credential.secret().is_empty() {
                return Err(OpenApiError::value_error(format!(
                    "Credential for scheme '{scheme}' is empty"
                )));
            }
        }

        let mut default_headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        default_headers.insert(USER_AGENT, header_value(&user_agent)?);

        for (name, value) in &self.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                OpenApiError::value_error(format!("Invalid default header name: {name}"))
            })?;
            default_headers.insert(header_name, header_value(value)?);
        }

        Ok(Configuration {
            host,
            default_headers,
            timeout,
            verify_tls: self.verify_tls.unwrap_or(true),
            credentials: RwLock::new(Arc::new(self.credentials)),
        })
    }
}

#[track_caller]
fn header_value(value: &str) -> Result<HeaderValue, OpenApiError> {
    HeaderValue::from_str(value)
        .map_err(|_| OpenApiError::value_error(format!("Invalid header value: {value:?}")))
}
