use crate::error::MonitorError;

use bridge_client::connection::resolve_url;
use bridge_client::error::{ConfigError, CoreError};

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies core errors convert into `MonitorError::Core` keeping the underlying text.
///
/// **WHY THIS MATTERS**: `main` uses `?` on config and connect calls. The operator must see
/// the core's reason (e.g. the empty-URL prompt), not a generic failure.
#[test]
fn given_link_error_when_converted_then_core_variant_keeps_message() {
    // GIVEN: The error connect reports for an empty URL
    let link_error = resolve_url("", false).expect_err("Empty URL must fail");

    // WHEN: Converting with `?` semantics
    let err = MonitorError::from(link_error);

    // THEN: Core variant, underlying message kept
    assert!(matches!(err, MonitorError::Core { .. }));
    assert!(
        err.to_string()
            .contains("Please enter the bridge IP or URL first")
    );
}

#[test]
fn given_config_error_when_converted_then_core_variant() {
    let config_error = ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: "reconnect_delay_ms must be greater than zero".to_string(),
    };

    let err: MonitorError = config_error.into();

    assert!(err.to_string().starts_with("Core Error: Config Validation Error"));
}

#[test]
fn given_no_url_error_when_displayed_then_kind_and_location_shown() {
    let err = MonitorError::NoUrl {
        message: String::from("Test"),
        location: ErrorLocation::from(Location::caller()),
    };

    let rendered = err.to_string();

    assert!(rendered.starts_with("No Url Error: Test ["), "{rendered}");
    assert!(rendered.contains("error.rs"), "{rendered}");
}

/// **VALUE**: Verifies the `Core` variant is built from the core's aggregate error, with
/// the location of the `?` site rather than the conversion.
#[test]
fn given_core_error_when_converted_then_core_variant_with_call_site_location() {
    // GIVEN: A link error wrapped in the core aggregate
    let link_error = resolve_url("ftp://10.0.0.5", false).expect_err("ftp:// must fail");
    let core_error = CoreError::from(link_error);
    let expected = core_error.to_string();

    // WHEN: Converting
    let expected_line = line!() + 1;
    let err = MonitorError::from(core_error);

    // THEN: Same text, location points here
    match err {
        MonitorError::Core { message, location } => {
            assert_eq!(message, expected);
            assert!(location.file.ends_with("error.rs"), "{}", location.file);
            assert_eq!(location.line, expected_line);
        }
        other => panic!("Expected Core variant, got {other:?}"),
    }
}
