//! Synchronous facade over the async client.
//!
//! Each call drives the async operation to completion on a current-thread
//! runtime owned by the client, so results and errors are identical to the
//! async API. Do not call these from inside an async context.

use crate::api_client::{ApiRequest, ApiResponse, RawResponse};
use crate::apis::{ConnectParams, DevicesApiClient};
use crate::codec::ResponseType;
use crate::configuration::Configuration;
use crate::error::OpenApiError;

use std::io;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

pub struct BlockingDevicesApiClient {
    runtime: Runtime,
    inner: DevicesApiClient,
}

impl BlockingDevicesApiClient {
    pub fn new(configuration: Arc<Configuration>) -> Result<Self, OpenApiError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(runtime_error)?;

        Ok(Self {
            runtime,
            inner: DevicesApiClient::new(configuration)?,
        })
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        self.inner.api_client().configuration()
    }

    pub fn connect(&self, params: ConnectParams) -> Result<(), OpenApiError> {
        self.runtime.block_on(self.inner.connect(params))
    }

    pub fn connect_with_http_info(
        &self,
        params: ConnectParams,
    ) -> Result<ApiResponse<()>, OpenApiError> {
        self.runtime.block_on(self.inner.connect_with_http_info(params))
    }

    pub fn execute<T: ResponseType>(&self, request: ApiRequest) -> Result<T, OpenApiError> {
        self.runtime.block_on(self.inner.api_client().execute(request))
    }

    pub fn execute_raw(&self, request: ApiRequest) -> Result<RawResponse, OpenApiError> {
        self.runtime
            .block_on(self.inner.api_client().execute_raw(request))
    }
}

/// Runtime construction failures happen before any request exists.
#[track_caller]
pub(crate) fn runtime_error(error: io::Error) -> OpenApiError {
    OpenApiError::value_error(format!("Failed to start runtime: {error}"))
}
