//! Debounce, ordering and failure behaviour of the handle validator.
//!
//! All tests run on a paused Tokio clock: sleeping in the test advances
//! virtual time and runs every timer that falls due on the way.

#![allow(clippy::unwrap_used)]

use kite_app::views::handle::TAKEN_MESSAGE;
use kite_app::{HandleFormatError, HandleStatus, HandleValidator};
use kite_core::HandleRules;
use kite_testkit::{ScriptedAvailability, StoppedClock};
use std::sync::Arc;
use std::time::Duration;

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn setup() -> (Arc<ScriptedAvailability>, HandleValidator) {
    let backend = Arc::new(ScriptedAvailability::new());
    let validator = HandleValidator::with_defaults(backend.clone());
    (backend, validator)
}

#[tokio::test(start_paused = true)]
async fn short_input_reports_error_and_never_checks() {
    let (backend, validator) = setup();

    for raw in ["a", "ab", "A-b!", "__"] {
        let state = validator.on_input_change(raw);
        assert_eq!(
            state.format_error,
            Some(HandleFormatError::TooShort { min: 3 }),
            "input {raw:?}"
        );
        assert_eq!(state.availability, None);
        assert!(!state.is_debouncing);
    }

    advance(5_000).await;
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn two_letter_handle_shows_min_length_message() {
    let (backend, validator) = setup();

    let state = validator.on_input_change("ab");
    assert_eq!(
        state.error_message().as_deref(),
        Some("Handle must be at least 3 characters")
    );

    advance(1_000).await;
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn input_is_normalized_before_validation() {
    let (backend, validator) = setup();

    let state = validator.on_input_change("My-Name!");
    assert_eq!(state.raw_input, "My-Name!");
    assert_eq!(state.normalized_input, "myname");
    assert_eq!(state.format_error, None);

    advance(600).await;
    assert_eq!(backend.calls(), vec!["myname"]);
}

#[tokio::test(start_paused = true)]
async fn keystrokes_within_window_produce_one_check_after_quiescence() {
    let (backend, validator) = setup();

    validator.on_input_change("a");
    advance(100).await;
    validator.on_input_change("ab");
    advance(100).await;
    validator.on_input_change("abc");

    advance(499).await;
    assert_eq!(backend.call_count(), 0);
    assert_eq!(validator.snapshot().status(), HandleStatus::Debouncing);

    advance(2).await;
    assert_eq!(backend.calls(), vec!["abc"]);

    let state = validator.snapshot();
    assert_eq!(state.availability, Some(true));
    assert!(validator.is_ready());
}

#[tokio::test(start_paused = true)]
async fn second_edit_in_window_replaces_first_check() {
    let (backend, validator) = setup();

    validator.on_input_change("abc");
    advance(300).await;
    validator.on_input_change("abcd");

    advance(2_000).await;
    assert_eq!(backend.calls(), vec!["abcd"]);
    assert_eq!(validator.snapshot().normalized_input, "abcd");
}

#[tokio::test(start_paused = true)]
async fn same_normalized_value_still_restarts_window() {
    let (backend, validator) = setup();

    validator.on_input_change("alice");
    advance(400).await;
    validator.on_input_change("Alice");

    advance(200).await;
    assert_eq!(backend.call_count(), 0);

    advance(400).await;
    assert_eq!(backend.calls(), vec!["alice"]);
}

#[tokio::test(start_paused = true)]
async fn late_response_for_old_value_is_discarded() {
    let (backend, validator) = setup();
    backend.set_taken("alice");
    backend.set_latency_ms("alice", 1_000);

    validator.on_input_change("alice");
    advance(600).await;
    assert!(validator.snapshot().is_checking);

    // "alice" answers at t=1500, "alicia" at t=1100
    validator.on_input_change("alicia");
    advance(2_000).await;

    assert_eq!(backend.calls(), vec!["alice", "alicia"]);
    let state = validator.snapshot();
    assert_eq!(state.normalized_input, "alicia");
    assert_eq!(state.availability, Some(true));
    assert_eq!(state.error_message(), None);
    assert!(validator.is_ready());
}

#[tokio::test(start_paused = true)]
async fn response_arriving_during_next_debounce_is_discarded() {
    let (backend, validator) = setup();
    backend.set_latency_ms("alice", 100);

    validator.on_input_change("alice");
    advance(550).await;
    validator.on_input_change("bob_1");

    // "alice" answers at t=600 while "bob_1" is still debouncing
    advance(100).await;
    let state = validator.snapshot();
    assert_eq!(state.availability, None);
    assert!(state.is_debouncing);
    assert!(!state.is_checking);
}

#[tokio::test(start_paused = true)]
async fn switching_to_invalid_input_drops_outstanding_result() {
    let (backend, validator) = setup();
    backend.set_latency_ms("alice", 1_000);

    validator.on_input_change("alice");
    advance(600).await;
    validator.on_input_change("al");

    advance(2_000).await;
    let state = validator.snapshot();
    assert_eq!(state.availability, None);
    assert_eq!(state.format_error, Some(HandleFormatError::TooShort { min: 3 }));
    assert!(!state.is_checking);
}

#[tokio::test(start_paused = true)]
async fn taken_handle_surfaces_message() {
    let (backend, validator) = setup();
    backend.set_taken("taken_one");

    validator.on_input_change("taken_one");
    advance(600).await;

    let state = validator.snapshot();
    assert_eq!(state.availability, Some(false));
    assert_eq!(state.format_error, None);
    assert_eq!(state.error_message().as_deref(), Some(TAKEN_MESSAGE));
    assert_eq!(state.status(), HandleStatus::Taken);
    assert!(!validator.is_ready());
}

#[tokio::test(start_paused = true)]
async fn checking_flag_tracks_outstanding_request() {
    let (backend, validator) = setup();
    backend.set_latency_ms("slowpoke", 1_000);

    validator.on_input_change("slowpoke");
    advance(600).await;
    let state = validator.snapshot();
    assert!(state.is_checking);
    assert!(!state.is_debouncing);
    assert_eq!(state.status(), HandleStatus::Checking);
    assert!(!validator.is_ready());

    advance(1_000).await;
    let state = validator.snapshot();
    assert!(!state.is_checking);
    assert_eq!(state.availability, Some(true));
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_indeterminate_and_not_retried() {
    let (backend, validator) = setup();
    backend.fail("flaky", "connection reset");

    validator.on_input_change("flaky");
    advance(600).await;

    let state = validator.snapshot();
    assert_eq!(state.availability, None);
    assert_eq!(state.error_message(), None);
    assert!(state.check_failed);
    assert_eq!(state.status(), HandleStatus::Indeterminate);
    assert!(!validator.is_ready());

    advance(60_000).await;
    assert_eq!(backend.call_count(), 1);

    // Typing continues to work after a failure
    validator.on_input_change("flaky2");
    advance(600).await;
    assert_eq!(validator.snapshot().availability, Some(true));
}

#[tokio::test(start_paused = true)]
async fn failed_debounce_timer_checks_immediately() {
    let backend = Arc::new(ScriptedAvailability::new());
    let clock = Arc::new(StoppedClock::new());
    let validator = HandleValidator::new(backend.clone(), clock.clone(), HandleRules::default());

    let state = validator.on_input_change("alice");
    assert!(state.is_debouncing);

    // No virtual time needs to pass for the check to land
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(clock.sleep_count(), 1);
    assert_eq!(backend.calls(), vec!["alice".to_string()]);
    assert_eq!(validator.snapshot().availability, Some(true));
    assert!(validator.is_ready());
}

#[tokio::test(start_paused = true)]
async fn explicit_retry_rechecks_current_value() {
    let (backend, validator) = setup();
    backend.fail("flaky", "timeout");

    validator.on_input_change("flaky");
    advance(600).await;
    assert!(validator.snapshot().check_failed);

    backend.set_available("flaky", true);
    let state = validator.retry();
    assert!(!state.check_failed);
    assert!(state.is_debouncing);

    advance(600).await;
    assert_eq!(backend.calls(), vec!["flaky", "flaky"]);
    assert!(validator.is_ready());
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_async_completion() {
    let (_backend, validator) = setup();
    let mut updates = validator.subscribe();

    validator.on_input_change("watcher");
    assert!(updates.borrow_and_update().is_debouncing);

    advance(600).await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().availability, Some(true));
}

#[tokio::test(start_paused = true)]
async fn dispose_cancels_pending_timer() {
    let (backend, validator) = setup();

    validator.on_input_change("alice");
    validator.dispose();
    assert!(!validator.snapshot().is_debouncing);

    advance(2_000).await;
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_validator_abandons_timer_and_in_flight_check() {
    let (backend, validator) = setup();
    validator.on_input_change("alice");
    drop(validator);
    advance(2_000).await;
    assert_eq!(backend.call_count(), 0);

    let validator = HandleValidator::with_defaults(backend.clone());
    backend.set_latency_ms("bobby", 1_000);
    validator.on_input_change("bobby");
    advance(600).await;
    drop(validator);

    // The dispatched request completes against a dropped validator
    advance(2_000).await;
    assert_eq!(backend.calls(), vec!["bobby"]);
}
