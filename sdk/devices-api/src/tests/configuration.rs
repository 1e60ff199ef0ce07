// Unit tests for Configuration
// Tests builder validation, environment lookup, auth params, and credential rotation

use crate::configuration::env::{HOST_ENV, TIMEOUT_ENV, TOKEN_ENV, VERIFY_TLS_ENV};
use crate::configuration::{
    Configuration, ConfigurationBuilder, Credential, CredentialSet, DEFAULT_TIMEOUT,
};
use crate::error::ErrorKind;
use crate::{DEFAULT_HOST, DEFAULT_USER_AGENT, DEVICE_JWT_AUTH};

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;

const API_KEY_AUTH: &str = "ApiKeyAuth";

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ============================================
// BUILDER
// ============================================

/// **VALUE**: Verifies an empty builder yields the documented defaults.
///
/// **WHY THIS MATTERS**: Most devices only set a token; everything else must work out of
/// the box against the hosted server.
///
/// **BUG THIS CATCHES**: Would catch a missing User-Agent or an unbounded timeout.
#[test]
fn given_empty_builder_when_built_then_uses_defaults() {
    // GIVEN/WHEN: No overrides
    let configuration = Configuration::builder().build().unwrap();

    // THEN: Hosted server, generator user agent, default timeout, TLS verified
    assert_eq!(configuration.base_path(), DEFAULT_HOST);
    assert_eq!(configuration.user_agent(), Some(DEFAULT_USER_AGENT));
    assert_eq!(configuration.timeout(), DEFAULT_TIMEOUT);
    assert!(configuration.verify_tls());
    assert!(configuration.credentials().is_empty());
}

#[test]
fn given_custom_user_agent_and_header_when_built_then_both_are_default_headers() {
    let configuration = Configuration::builder()
        .with_user_agent("device-agent/4.0")
        .with_default_header("X-Tenant", "acme")
        .build()
        .unwrap();

    assert_eq!(configuration.user_agent(), Some("device-agent/4.0"));
    assert_eq!(configuration.default_headers()["x-tenant"], "acme");
}

/// **VALUE**: Verifies non-HTTP host schemes are rejected at build time.
///
/// **WHY THIS MATTERS**: A typo such as `htps://` or a bare hostname would otherwise fail
/// on the first request with an opaque transport error.
///
/// **BUG THIS CATCHES**: Would catch hosts accepted without scheme validation.
#[test]
fn given_non_http_host_when_built_then_returns_value_error() {
    let error = Configuration::builder()
        .with_host("ftp://example.com/api")
        .build()
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Value);
    assert!(error.to_string().contains("Invalid host scheme"));
}

#[test]
fn given_unparseable_host_when_built_then_returns_value_error() {
    let error = Configuration::builder()
        .with_host("not a url")
        .build()
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Value);
}

#[test]
fn given_zero_timeout_when_built_then_returns_value_error() {
    let error = Configuration::builder()
        .with_timeout(Duration::ZERO)
        .build()
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Value);
}

#[test]
fn given_invalid_default_header_name_when_built_then_returns_value_error() {
    let error = Configuration::builder()
        .with_default_header("bad header", "x")
        .build()
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Value);
}

/// **VALUE**: Verifies Debug output never contains secrets.
///
/// **WHY THIS MATTERS**: Configurations end up in logs via `{:?}`; a device JWT in a log
/// file is a stolen device.
///
/// **BUG THIS CATCHES**: Would catch a derived Debug that prints credential contents.
#[test]
fn given_configuration_with_token_when_debug_formatted_then_token_is_hidden() {
    let configuration = Configuration::builder()
        .with_device_token("super-secret-jwt")
        .build()
        .unwrap();

    let debug = format!("{configuration:?}");

    assert!(!debug.contains("super-secret-jwt"));
    assert!(debug.contains(DEVICE_JWT_AUTH));
}

// ============================================
// ENVIRONMENT LOOKUP
// ============================================

#[test]
fn given_all_variables_when_loaded_from_lookup_then_builder_uses_them() {
    // GIVEN: Every supported variable, with surrounding whitespace
    let lookup = lookup_from(&[
        (HOST_ENV, " http://localhost:8080/api/devices/v1/deviceconnect "),
        (TOKEN_ENV, "jwt-from-env"),
        (TIMEOUT_ENV, "5"),
        (VERIFY_TLS_ENV, "false"),
    ]);

    // WHEN: Building from the lookup
    let configuration = ConfigurationBuilder::from_lookup(lookup)
        .unwrap()
        .build()
        .unwrap();

    // THEN: Values applied
    assert_eq!(
        configuration.base_path(),
        "http://localhost:8080/api/devices/v1/deviceconnect"
    );
    assert_eq!(configuration.timeout(), Duration::from_secs(5));
    assert!(!configuration.verify_tls());
    assert_eq!(
        configuration.credential(DEVICE_JWT_AUTH),
        Some(Credential::bearer("jwt-from-env"))
    );
}

#[test]
fn given_empty_variables_when_loaded_from_lookup_then_defaults_are_kept() {
    let lookup = lookup_from(&[(HOST_ENV, ""), (TOKEN_ENV, "   ")]);

    let configuration = ConfigurationBuilder::from_lookup(lookup)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(configuration.base_path(), DEFAULT_HOST);
    assert!(configuration.credential(DEVICE_JWT_AUTH).is_none());
}

#[test]
fn given_non_numeric_timeout_when_loaded_from_lookup_then_returns_value_error() {
    let lookup = lookup_from(&[(TIMEOUT_ENV, "ten")]);

    let error = ConfigurationBuilder::from_lookup(lookup).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Value);
    assert!(error.to_string().contains(TIMEOUT_ENV));
}

#[test]
fn given_unrecognised_verify_flag_when_loaded_from_lookup_then_returns_value_error() {
    let lookup = lookup_from(&[(VERIFY_TLS_ENV, "maybe")]);

    assert!(ConfigurationBuilder::from_lookup(lookup).is_err());
}

// ============================================
// AUTH PARAMS
// ============================================

/// **VALUE**: Verifies each credential kind lands where its scheme says.
///
/// **WHY THIS MATTERS**: Bearer tokens go in Authorization, header API keys under their
/// own name, query API keys in the URL. Mixing these up means every call is a 401.
///
/// **BUG THIS CATCHES**: Would catch a query key sent as a header or a missing prefix.
#[test]
fn given_bearer_and_api_keys_when_auth_params_computed_then_each_is_placed_correctly() {
    // GIVEN: One credential of each kind
    let configuration = Configuration::builder()
        .with_device_token("jwt")
        .with_credential(
            API_KEY_AUTH,
            Credential::api_key_header("X-Api-Key", "k-1").with_prefix("Token"),
        )
        .with_credential("QueryKey", Credential::api_key_query("api_key", "q-1"))
        .build()
        .unwrap();

    // WHEN: Computing params for all three plus an unknown scheme
    let params = configuration
        .auth_params(&[DEVICE_JWT_AUTH, API_KEY_AUTH, "QueryKey", "Unconfigured"])
        .unwrap();

    // THEN: Two headers, one query pair, unknown scheme ignored
    assert_eq!(params.headers.len(), 2);
    assert_eq!(params.headers[0].0, AUTHORIZATION);
    assert_eq!(params.headers[0].1, "Bearer jwt");
    assert!(params.headers[0].1.is_sensitive());
    assert_eq!(params.headers[1].0.as_str(), "x-api-key");
    assert_eq!(params.headers[1].1, "Token k-1");
    assert_eq!(params.query, vec![("api_key".to_string(), "q-1".to_string())]);
}

#[test]
fn given_no_requested_schemes_when_auth_params_computed_then_nothing_is_added() {
    let configuration = Configuration::builder()
        .with_device_token("jwt")
        .build()
        .unwrap();

    assert!(configuration.auth_params(&[]).unwrap().is_empty());
}

// ============================================
// ROTATION
// ============================================

#[test]
fn given_rotated_credential_when_read_then_new_value_is_visible_and_others_kept() {
    let configuration = Configuration::builder()
        .with_device_token("old")
        .with_credential(API_KEY_AUTH, Credential::api_key_header("X-Api-Key", "k"))
        .build()
        .unwrap();

    configuration.rotate_credential(DEVICE_JWT_AUTH, Credential::bearer("new"));

    assert_eq!(
        configuration.credential(DEVICE_JWT_AUTH),
        Some(Credential::bearer("new"))
    );
    assert!(configuration.credential(API_KEY_AUTH).is_some());

    configuration.clear_credential(DEVICE_JWT_AUTH);
    assert!(configuration.credential(DEVICE_JWT_AUTH).is_none());
}

fn generation_set(generation: usize) -> CredentialSet {
    let mut set = CredentialSet::new();
    set.insert(
        DEVICE_JWT_AUTH.to_string(),
        Credential::bearer(format!("token-{generation}")),
    );
    set.insert(
        API_KEY_AUTH.to_string(),
        Credential::api_key_header("X-Api-Key", format!("key-{generation}")),
    );
    set
}

fn generation_of(value: &str, prefix: &str) -> usize {
    value
        .strip_prefix(prefix)
        .and_then(|rest| rest.parse().ok())
        .unwrap_or_else(|| panic!("unexpected credential value {value}"))
}

/// **VALUE**: Verifies a reader never sees half of a credential swap.
///
/// **WHY THIS MATTERS**: Tokens are rotated while requests are in flight. A request that
/// pairs the new bearer token with the old API key is rejected by the server and is
/// nearly impossible to reproduce.
///
/// **BUG THIS CATCHES**: Would catch auth params computed from two separate lock
/// acquisitions, or a rotation that mutates the live set in place.
#[test]
fn given_concurrent_readers_when_credentials_replaced_then_each_read_is_consistent() {
    // GIVEN: A configuration at generation 0
    let configuration = Arc::new(Configuration::builder().build().unwrap());
    configuration.replace_credentials(generation_set(0));

    // WHEN: 100 readers compute auth params while a writer swaps 200 generations
    thread::scope(|scope| {
        let writer = Arc::clone(&configuration);
        scope.spawn(move || {
            for generation in 1..=200 {
                writer.replace_credentials(generation_set(generation));
            }
        });

        for _ in 0..100 {
            let reader = Arc::clone(&configuration);
            scope.spawn(move || {
                for _ in 0..50 {
                    let params = reader
                        .auth_params(&[DEVICE_JWT_AUTH, API_KEY_AUTH])
                        .unwrap();

                    // THEN: Both headers come from the same generation
                    let bearer = params.headers[0].1.to_str().unwrap();
                    let api_key = params.headers[1].1.to_str().unwrap();
                    assert_eq!(
                        generation_of(bearer, "Bearer token-"),
                        generation_of(api_key, "key-")
                    );
                }
            });
        }
    });

    // THEN: Final state is the last generation
    assert_eq!(
        configuration.credential(DEVICE_JWT_AUTH),
        Some(Credential::bearer("token-200"))
    );
}

/// **VALUE**: Verifies an empty token or key is rejected at build time.
///
/// **WHY THIS MATTERS**: An empty bearer token renders as `Bearer ` and every call fails
/// with a 401 far from where the configuration was written.
///
/// **BUG THIS CATCHES**: Would catch credentials accepted without checking their material.
#[test]
fn given_empty_credential_when_built_then_returns_value_error() {
    let empty_token = Configuration::builder().with_device_token("").build();
    let empty_key = Configuration::builder()
        .with_credential(API_KEY_AUTH, Credential::api_key_header("X-Api-Key", ""))
        .build();

    assert_eq!(empty_token.unwrap_err().kind(), ErrorKind::Value);
    let error = empty_key.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Value);
    assert!(error.to_string().contains(API_KEY_AUTH));
}
