// Unit tests for BridgeConfig loading and validation
// Environment-override tests mutate process env, so they run serially

use crate::config::{BRIDGE_URL_ENV, BridgeConfig, SECURE_ORIGIN_ENV};
use crate::error::ConfigError;

use std::env;
use std::fs;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

fn write_config(contents: &str) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("bridge.toml"), contents).expect("Failed to write config");
    dir
}

fn clear_env() {
    // SAFETY: env-mutating tests are marked #[serial].
    unsafe {
        env::remove_var(BRIDGE_URL_ENV);
        env::remove_var(SECURE_ORIGIN_ENV);
    }
}

fn set_env(name: &str, value: &str) {
    // SAFETY: env-mutating tests are marked #[serial].
    unsafe { env::set_var(name, value) }
}

/// **VALUE**: Verifies a first run with no config file still starts with sane defaults.
///
/// **BUG THIS CATCHES**: Would catch if a missing file became an error, blocking startup
/// on every fresh install.
#[test]
fn given_missing_config_file_when_loaded_then_defaults() {
    // GIVEN: An empty config directory
    let dir = TempDir::new().expect("Failed to create temp dir");

    // WHEN: Loading
    let config = BridgeConfig::load(dir.path()).expect("Missing file should yield defaults");

    // THEN: Defaults, including the 5 second reconnect delay
    assert_eq!(config, BridgeConfig::default());
    assert_eq!(config.default_url, None);
    assert!(!config.secure_origin);
    assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
}

#[test]
fn given_partial_config_file_when_loaded_then_missing_keys_defaulted() {
    let dir = write_config("default_url = \"ws://10.0.0.5:8765\"\n");

    let config = BridgeConfig::load(dir.path()).expect("Config should load");

    assert_eq!(config.default_url.as_deref(), Some("ws://10.0.0.5:8765"));
    assert!(!config.secure_origin);
    assert_eq!(config.reconnect_delay_ms, 5_000);
}

#[test]
fn given_invalid_toml_when_loaded_then_parse_error() {
    let dir = write_config("default_url = [not toml");

    let result = BridgeConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies invalid values are rejected at load time, not at first connect.
#[test]
fn given_invalid_values_when_loaded_then_validation_error() {
    let cases = [
        "reconnect_delay_ms = 0\n",
        "default_url = \"\"\n",
        "default_url = \"http://10.0.0.5:8765\"\n",
    ];

    for contents in cases {
        let dir = write_config(contents);

        let result = BridgeConfig::load(dir.path());

        assert!(
            matches!(result, Err(ConfigError::ValidationError { .. })),
            "'{}' should fail validation, got {result:?}",
            contents.trim()
        );
    }
}

#[test]
fn given_secure_url_when_validated_then_ok() {
    let config = BridgeConfig {
        default_url: Some("wss://cleanbot.example.org".to_string()),
        secure_origin: true,
        reconnect_delay_ms: 250,
    };

    assert!(config.validate().is_ok());
    assert_eq!(config.reconnect_delay(), Duration::from_millis(250));
}

/// **VALUE**: Verifies environment variables win over the file.
///
/// **WHY THIS MATTERS**: Deployments point the monitor at a different bridge without
/// editing files on the device.
#[test]
#[serial]
fn given_env_overrides_when_applied_then_env_wins() {
    // GIVEN: A file-based config and env overrides
    clear_env();
    let mut config = BridgeConfig {
        default_url: Some("ws://10.0.0.5:8765".to_string()),
        ..BridgeConfig::default()
    };
    set_env(BRIDGE_URL_ENV, "ws://192.168.1.20:8765");
    set_env(SECURE_ORIGIN_ENV, "TRUE");

    // WHEN: Applying overrides
    let result = config.apply_env_overrides();
    clear_env();

    // THEN: Env values replaced the file values
    assert!(result.is_ok(), "Overrides should apply: {result:?}");
    assert_eq!(config.default_url.as_deref(), Some("ws://192.168.1.20:8765"));
    assert!(config.secure_origin);
}

#[test]
#[serial]
fn given_empty_env_values_when_applied_then_config_unchanged() {
    clear_env();
    let mut config = BridgeConfig {
        default_url: Some("ws://10.0.0.5:8765".to_string()),
        secure_origin: true,
        ..BridgeConfig::default()
    };
    let before = config.clone();
    set_env(BRIDGE_URL_ENV, "   ");
    set_env(SECURE_ORIGIN_ENV, "");

    let result = config.apply_env_overrides();
    clear_env();

    assert!(result.is_ok());
    assert_eq!(config, before);
}

#[test]
#[serial]
fn given_unrecognised_secure_origin_value_when_applied_then_validation_error() {
    clear_env();
    let mut config = BridgeConfig::default();
    set_env(SECURE_ORIGIN_ENV, "sometimes");

    let result = config.apply_env_overrides();
    clear_env();

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
#[serial]
fn given_env_url_with_bad_scheme_when_applied_then_validation_error() {
    clear_env();
    let mut config = BridgeConfig::default();
    set_env(BRIDGE_URL_ENV, "tcp://10.0.0.5:8765");

    let result = config.apply_env_overrides();
    clear_env();

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

/// **VALUE**: Verifies config validation accepts exactly what connect accepts.
///
/// **BUG THIS CATCHES**: Would catch the two scheme checks drifting apart, e.g. an
/// uppercase `WS://` URL failing at load while the same string connects fine.
#[test]
fn given_urls_when_validated_then_same_verdict_as_connect() {
    let cases = [
        "WS://10.0.0.5:8765",
        "Wss://cleanbot.example.org",
        "ws:10.0.0.5:8765",
        "ws:/10.0.0.5:8765",
        "ws://",
    ];

    for url in cases {
        let config = BridgeConfig {
            default_url: Some(url.to_string()),
            ..BridgeConfig::default()
        };

        let validated = config.validate().is_ok();
        let resolved = crate::connection::resolve_url(url, false).is_ok();

        assert_eq!(validated, resolved, "'{url}' must get the same verdict");
    }

    let uppercase = BridgeConfig {
        default_url: Some("WS://10.0.0.5:8765".to_string()),
        ..BridgeConfig::default()
    };
    assert!(uppercase.validate().is_ok());
}
