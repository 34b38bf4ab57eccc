use crate::ErrorLocation;

use std::panic::Location;

#[track_caller]
fn captured_here() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every error in the bridge client carries one of these. If the
/// capture breaks, connection and config errors lose the only pointer back to their origin.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated or if
/// the line/column fields are swapped.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN/WHEN: A location captured through a #[track_caller] helper
    let expected_line = line!() + 1;
    let location = captured_here();

    // THEN: The call site is recorded, not the helper
    assert!(
        location.file.ends_with("error_location.rs"),
        "Should capture file path, got {}",
        location.file
    );
    assert_eq!(location.line, expected_line, "Should capture the call-site line");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the bracketed `[file:line:column]` display format.
///
/// **BUG THIS CATCHES**: Would catch a Display change that drops brackets or a field,
/// which would make every `"... {location}"` error message harder to read.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "src/connection/manager.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting as string
    let formatted = location.to_string();

    // THEN: Should produce "[file:line:column]"
    assert_eq!(formatted, "[src/connection/manager.rs:42:7]");
}
