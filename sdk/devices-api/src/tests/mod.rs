mod cancel;
mod configuration;
mod logging;
