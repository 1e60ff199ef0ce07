//! Configuration from environment variables.
//!
//! Recognised variables:
//!
//! - `DEVICECONNECT_HOST`: base URL
//! - `DEVICECONNECT_TOKEN`: device JWT for the `DeviceJWT` scheme
//! - `DEVICECONNECT_TIMEOUT_SECS`: request timeout in whole seconds
//! - `DEVICECONNECT_VERIFY_TLS`: `true`/`false`, `1`/`0`

use super::{Configuration, ConfigurationBuilder};
use crate::error::OpenApiError;

use std::env;
use std::time::Duration;

use log::{debug, info, warn};

pub const HOST_ENV: &str = "DEVICECONNECT_HOST";
pub const TOKEN_ENV: &str = "DEVICECONNECT_TOKEN";
pub const TIMEOUT_ENV: &str = "DEVICECONNECT_TIMEOUT_SECS";
pub const VERIFY_TLS_ENV: &str = "DEVICECONNECT_VERIFY_TLS";

impl Configuration {
    /// Load `.env` if present, then build from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError::Value`] if a variable is set but malformed, or
    /// the resulting configuration fails validation.
    pub fn from_env() -> Result<Self, OpenApiError> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {e}"),
        }

        ConfigurationBuilder::from_lookup(|key| env::var(key).ok())?.build()
    }
}

impl ConfigurationBuilder {
    /// Seed a builder from a variable lookup. Unset or empty variables keep
    /// the builder defaults.
    #[track_caller]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OpenApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            let value = lookup(key)?;
            if value.trim().is_empty() {
                warn!("{key} is set but empty, ignoring it");
                return None;
            }
            Some(value)
        };
        let mut builder = ConfigurationBuilder::default();

        if let Some(host) = read(HOST_ENV) {
            builder = builder.with_host(host.trim());
        }

        if let Some(token) = read(TOKEN_ENV) {
            builder = builder.with_device_token(token.trim());
        }

        if let Some(raw) = read(TIMEOUT_ENV) {
            let seconds: u64 = raw.trim().parse().map_err(|_| {
                OpenApiError::value_error(format!(
                    "{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            builder = builder.with_timeout(Duration::from_secs(seconds));
        }

        if let Some(raw) = read(VERIFY_TLS_ENV) {
            let verify = match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(OpenApiError::value_error(format!(
                        "{VERIFY_TLS_ENV} must be true or false, got '{raw}'"
                    )));
                }
            };
            builder = builder.with_verify_tls(verify);
        }

        Ok(builder)
    }
}
