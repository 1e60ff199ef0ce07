pub mod devices_api_client;

pub use devices_api_client::{ConnectParams, DeviceStream, DevicesApiClient};
