//! Device Connect
//!
//! Device facing API for managing persistent device connections.
//!
//! One crate exposes everything an application needs: the operation client,
//! the shared configuration, the HTTP transport, the error taxonomy and the
//! models.
//!
//! ```ignore
//! let configuration = Arc::new(
//!     Configuration::builder()
//!         .with_device_token(jwt)
//!         .build()?,
//! );
//! let client = DevicesApiClient::new(configuration)?;
//! let stream = client.open_stream().await?;
//! ```

pub mod api_client;
pub mod apis;
pub mod blocking;
pub mod codec;
pub mod configuration;
pub mod error;
pub mod logging;
pub mod models;

#[cfg(test)]
mod tests;

pub use api_client::{ApiClient, ApiRequest, ApiResponse, CancelHandle, CancelSignal, RawResponse};
pub use apis::{ConnectParams, DeviceStream, DevicesApiClient};
pub use blocking::BlockingDevicesApiClient;
pub use codec::{Model, Nullable};
pub use configuration::{ApiKeyLocation, Configuration, ConfigurationBuilder, Credential};
pub use error::{ApiException, ErrorKind, OpenApiError, TransportFailure};
pub use models::Error as ErrorModel;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HOSTED_SERVER_URL: &str = "https://hosted.mender.io";
pub const API_BASE_PATH: &str = "/api/devices/v1/deviceconnect";
pub const DEFAULT_HOST: &str = const_format::concatcp!(HOSTED_SERVER_URL, API_BASE_PATH);
pub const DEFAULT_USER_AGENT: &str = const_format::concatcp!("OpenAPI-Generator/", VERSION, "/rust");

/// Security scheme of the device API: `Authorization: Bearer <device JWT>`.
pub const DEVICE_JWT_AUTH: &str = "DeviceJWT";
