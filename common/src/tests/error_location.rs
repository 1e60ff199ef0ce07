use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures the calling file and line.
///
/// **WHY THIS MATTERS**: Every SDK error carries an ErrorLocation. If capture breaks,
/// a failing request reports no usable origin.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` propagation or
/// file/line extraction stops working.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN/WHEN: Capturing the current location
    let location = ErrorLocation::from(Location::caller());

    // THEN: File, line and column are populated
    assert!(location.file.contains("error_location.rs"));
    assert!(location.line > 0);
    assert!(location.column > 0);
}

/// **VALUE**: Verifies the bracketed `[file:line:column]` display format.
///
/// **WHY THIS MATTERS**: Error messages end with the location; tooling and humans both
/// rely on the exact shape.
///
/// **BUG THIS CATCHES**: Would catch a Display change that drops brackets or separators.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "src/api_client/mod.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting
    let formatted = location.to_string();

    // THEN: Bracketed file:line:column
    assert_eq!(formatted, "[src/api_client/mod.rs:42:7]");
}

/// **VALUE**: Verifies `#[track_caller]` helpers report their caller's line.
///
/// **WHY THIS MATTERS**: SDK constructors are `#[track_caller]` so errors point at the
/// call site rather than the constructor.
///
/// **BUG THIS CATCHES**: Would catch if location capture collapsed to a single line.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    let first = capture_location();
    let second = capture_location();

    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line);
}
