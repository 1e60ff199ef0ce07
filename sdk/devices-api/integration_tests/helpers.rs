use devices_api::{API_BASE_PATH, Configuration, ConfigurationBuilder};

use std::sync::Arc;

use wiremock::MockServer;

pub const DEVICE_TOKEN: &str = "device-jwt";

/// Full server-side path of an operation path.
pub fn api_path(operation_path: &str) -> String {
    format!("{API_BASE_PATH}{operation_path}")
}

/// Builder pointed at the mock server, authenticated as a device.
pub fn builder_for(server: &MockServer) -> ConfigurationBuilder {
    Configuration::builder()
        .with_host(format!("{}{API_BASE_PATH}", server.uri()))
        .with_device_token(DEVICE_TOKEN)
}

pub fn configuration_for(server: &MockServer) -> Arc<Configuration> {
    Arc::new(builder_for(server).build().unwrap())
}
