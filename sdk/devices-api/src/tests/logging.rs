use crate::logging::initialize;

use log::LevelFilter;

/// **VALUE**: Verifies repeated initialization is a no-op rather than an error.
///
/// **WHY THIS MATTERS**: Applications and their test suites call initialize from several
/// entry points; the second call must not fail or panic.
///
/// **BUG THIS CATCHES**: Would catch the Once/AtomicBool guard being removed, which makes
/// fern report "logger already set".
#[test]
fn given_logger_initialized_when_initialized_again_then_returns_ok() {
    // GIVEN: First initialization
    initialize(LevelFilter::Debug).unwrap();

    // WHEN/THEN: Second initialization is accepted
    initialize(LevelFilter::Info).unwrap();
}
