// Unit tests for logger module initialization logic
// Tests focus on idempotence and error handling

use crate::logger::{LOG_FILE_NAME, initialize, initialize_internal};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when trying to set a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path());
    let result2 = initialize(temp_dir.path());

    // THEN: Both return Ok and the log file exists
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
    assert!(temp_dir.path().join(LOG_FILE_NAME).exists());
}

/// **VALUE**: Verifies that an unusable log directory is an error, not a panic.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` were unwrapped, crashing the
/// monitor at startup when the data directory is not writable.
#[test]
fn given_invalid_log_dir_when_initialized_then_returns_monitor_error() {
    // GIVEN: A path that cannot hold a file
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Initializing the dispatch
    let result = initialize_internal(&invalid_dir);

    // THEN: Monitor error naming the log file
    let err = result.expect_err("Should return error for invalid log directory");
    let err_string = err.to_string();
    assert!(err_string.starts_with("Monitor Error:"), "{err_string}");
    assert!(err_string.contains(LOG_FILE_NAME), "{err_string}");
}
