mod api_client;
mod blocking;
mod configuration_env;
mod device_stream;
mod devices_api;
mod helpers;
