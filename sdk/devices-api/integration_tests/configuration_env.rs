use devices_api::configuration::env::{HOST_ENV, TIMEOUT_ENV, TOKEN_ENV, VERIFY_TLS_ENV};
use devices_api::{Configuration, Credential, DEFAULT_HOST, DEVICE_JWT_AUTH, ErrorKind};

use std::env;
use std::time::Duration;

use serial_test::serial;

const ALL_VARIABLES: [&str; 4] = [HOST_ENV, TOKEN_ENV, TIMEOUT_ENV, VERIFY_TLS_ENV];

fn clear_environment() {
    for name in ALL_VARIABLES {
        // SAFETY: #[serial] keeps environment mutation to one test at a time.
        unsafe { env::remove_var(name) };
    }
}

fn set(name: &str, value: &str) {
    // SAFETY: #[serial] keeps environment mutation to one test at a time.
    unsafe { env::set_var(name, value) };
}

/// **VALUE**: Verifies `from_env` reads the process environment.
///
/// **WHY THIS MATTERS**: Device agents are configured by their service unit's environment,
/// not by code.
///
/// **BUG THIS CATCHES**: Would catch a renamed variable or a lookup that is never applied.
#[test]
#[serial]
fn given_environment_variables_when_from_env_called_then_configuration_uses_them() {
    // GIVEN: Host, token and timeout in the environment
    clear_environment();
    set(HOST_ENV, "http://device-gateway.local/api/devices/v1/deviceconnect");
    set(TOKEN_ENV, "env-jwt");
    set(TIMEOUT_ENV, "12");

    // WHEN: Loading
    let configuration = Configuration::from_env();
    clear_environment();
    let configuration = configuration.unwrap();

    // THEN: All three applied
    assert_eq!(
        configuration.base_path(),
        "http://device-gateway.local/api/devices/v1/deviceconnect"
    );
    assert_eq!(
        configuration.credential(DEVICE_JWT_AUTH),
        Some(Credential::bearer("env-jwt"))
    );
    assert_eq!(configuration.timeout(), Duration::from_secs(12));
}

#[test]
#[serial]
fn given_clean_environment_when_from_env_called_then_defaults_apply() {
    clear_environment();

    let configuration = Configuration::from_env().unwrap();

    assert_eq!(configuration.base_path(), DEFAULT_HOST);
    assert!(configuration.verify_tls());
}

#[test]
#[serial]
fn given_malformed_verify_flag_when_from_env_called_then_returns_value_error() {
    clear_environment();
    set(VERIFY_TLS_ENV, "sometimes");

    let result = Configuration::from_env();
    clear_environment();

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Value);
}
