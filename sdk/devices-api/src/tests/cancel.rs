use crate::api_client::CancelHandle;

use std::time::Duration;

#[tokio::test]
async fn given_cancel_handle_when_cancelled_then_existing_signal_resolves() {
    // GIVEN: A signal taken before cancellation
    let handle = CancelHandle::new();
    let signal = handle.signal();
    assert!(!signal.is_cancelled());

    // WHEN: Cancelling
    handle.cancel();

    // THEN: The signal observes it and its future completes
    assert!(signal.is_cancelled());
    assert!(handle.is_cancelled());
    tokio::time::timeout(Duration::from_secs(1), signal.cancelled())
        .await
        .unwrap();
}

#[tokio::test]
async fn given_already_cancelled_handle_when_new_signal_taken_then_it_is_cancelled() {
    let handle = CancelHandle::default();
    handle.cancel();

    let signal = handle.signal();

    assert!(signal.is_cancelled());
    tokio::time::timeout(Duration::from_secs(1), signal.cancelled())
        .await
        .unwrap();
}

/// **VALUE**: Verifies dropping the handle does not cancel.
///
/// **WHY THIS MATTERS**: A handle going out of scope is not a user decision; treating it
/// as cancellation would abort requests at random.
///
/// **BUG THIS CATCHES**: Would catch `cancelled()` resolving on channel closure.
#[tokio::test]
async fn given_dropped_handle_when_awaiting_signal_then_never_resolves() {
    let handle = CancelHandle::new();
    let signal = handle.signal();
    drop(handle);

    let waited = tokio::time::timeout(Duration::from_millis(50), signal.cancelled()).await;

    assert!(waited.is_err());
    assert!(!signal.is_cancelled());
}
