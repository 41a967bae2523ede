//! Handle Validation Workflow
//!
//! Debounced, race-free availability checking for the handle field.
//!
//! Every edit bumps a generation counter under the state lock. The debounce
//! timer and the availability check both capture the generation they were
//! started for and drop their result if it no longer matches, so a response
//! can only ever land on the input that produced it.
//!
//! Two tasks are involved per check:
//! - the timer task, owned by the validator and aborted on the next edit
//! - the check task, spawned when the timer fires and never aborted; a stale
//!   check runs to completion and its result is discarded
//!
//! Both tasks hold only a `Weak` reference to the shared state. Dropping the
//! validator (unmounting the screen) aborts the timer and leaves any
//! outstanding check with nothing to write to.

use crate::views::handle::{normalize_handle, validate_handle_format, HandleValidationState};
use kite_core::effects::{HandleAvailabilityEffects, PhysicalTimeEffects, RealTimeHandler};
use kite_core::HandleRules;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Shared {
    state: HandleValidationState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    updates: watch::Sender<HandleValidationState>,
}

impl Shared {
    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Validator for a single handle input field.
pub struct HandleValidator {
    shared: Arc<Mutex<Shared>>,
    checker: Arc<dyn HandleAvailabilityEffects>,
    time: Arc<dyn PhysicalTimeEffects>,
    rules: HandleRules,
}

impl HandleValidator {
    /// Create a validator.
    pub fn new(
        checker: Arc<dyn HandleAvailabilityEffects>,
        time: Arc<dyn PhysicalTimeEffects>,
        rules: HandleRules,
    ) -> Self {
        let (updates, _) = watch::channel(HandleValidationState::default());
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: HandleValidationState::default(),
                generation: 0,
                timer: None,
                updates,
            })),
            checker,
            time,
            rules,
        }
    }

    /// Create a validator with default rules and the real clock.
    pub fn with_defaults(checker: Arc<dyn HandleAvailabilityEffects>) -> Self {
        Self::new(checker, Arc::new(RealTimeHandler::new()), HandleRules::default())
    }

    /// Rules this validator enforces.
    pub fn rules(&self) -> &HandleRules {
        &self.rules
    }

    /// Handle one edit of the input field.
    ///
    /// Format errors are applied before this returns. A valid value schedules
    /// an availability check `debounce_ms` from now, replacing any check
    /// scheduled by an earlier edit. Must be called from within a Tokio
    /// runtime for the check to be scheduled.
    pub fn on_input_change(&self, raw: &str) -> HandleValidationState {
        let normalized = normalize_handle(raw, self.rules.max_len);

        let mut shared = self.shared.lock();
        shared.generation = shared.generation.wrapping_add(1);
        let generation = shared.generation;
        shared.cancel_timer();

        shared.state = HandleValidationState {
            raw_input: raw.to_string(),
            format_error: if normalized.is_empty() {
                None
            } else {
                validate_handle_format(&normalized, &self.rules).err()
            },
            normalized_input: normalized,
            ..HandleValidationState::default()
        };

        if !shared.state.normalized_input.is_empty() && shared.state.format_error.is_none() {
            let value = shared.state.normalized_input.clone();
            if let Some(timer) = self.schedule_check(generation, value) {
                shared.timer = Some(timer);
                shared.state.is_debouncing = true;
            }
        }

        shared.publish();
        shared.state.clone()
    }

    /// Re-run the pipeline for the current input.
    ///
    /// This is the only way a failed check is attempted again; the validator
    /// never retries in the background.
    pub fn retry(&self) -> HandleValidationState {
        let raw = self.shared.lock().state.raw_input.clone();
        tracing::debug!(raw = %raw, "retrying handle validation");
        self.on_input_change(&raw)
    }

    /// Current state.
    pub fn snapshot(&self) -> HandleValidationState {
        self.shared.lock().state.clone()
    }

    /// Subscribe to state changes, including async check completions.
    pub fn subscribe(&self) -> watch::Receiver<HandleValidationState> {
        self.shared.lock().updates.subscribe()
    }

    /// Whether the current handle can be submitted.
    pub fn is_ready(&self) -> bool {
        self.shared.lock().state.is_ready(self.rules.min_len)
    }

    /// Abandon any scheduled or outstanding check.
    ///
    /// Called automatically on drop. The field keeps its text and format
    /// state; pending flags are cleared.
    pub fn dispose(&self) {
        let mut shared = self.shared.lock();
        shared.generation = shared.generation.wrapping_add(1);
        shared.cancel_timer();
        shared.state.is_debouncing = false;
        shared.state.is_checking = false;
        shared.publish();
    }

    fn schedule_check(&self, generation: u64, value: String) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(error = %e, "no runtime; handle availability check not scheduled");
                return None;
            }
        };

        let shared = Arc::downgrade(&self.shared);
        let checker = Arc::clone(&self.checker);
        let time = Arc::clone(&self.time);
        let delay_ms = self.rules.debounce_ms;

        tracing::trace!(handle = %value, delay_ms, "scheduling availability check");
        Some(runtime.spawn(async move {
            if let Err(e) = time.sleep_ms(delay_ms).await {
                tracing::warn!(error = %e, "debounce timer failed; checking immediately");
            }
            if dispatch_check(&shared, generation) {
                tokio::spawn(run_check(shared, checker, generation, value));
            }
        }))
    }
}

impl Drop for HandleValidator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for HandleValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleValidator")
            .field("state", &self.snapshot())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

/// Move from debouncing to checking. Returns false if the edit is stale.
fn dispatch_check(shared: &Weak<Mutex<Shared>>, generation: u64) -> bool {
    let Some(shared) = shared.upgrade() else {
        return false;
    };
    let mut shared = shared.lock();
    if shared.generation != generation {
        return false;
    }
    // Our own handle; the task is about to finish.
    shared.timer = None;
    shared.state.is_debouncing = false;
    shared.state.is_checking = true;
    shared.publish();
    true
}

async fn run_check(
    shared: Weak<Mutex<Shared>>,
    checker: Arc<dyn HandleAvailabilityEffects>,
    generation: u64,
    value: String,
) {
    tracing::debug!(handle = %value, "checking handle availability");
    let result = checker.check_handle_availability(&value).await;

    let Some(shared) = shared.upgrade() else {
        tracing::debug!(handle = %value, "validator dropped; abandoning availability result");
        return;
    };
    let mut shared = shared.lock();
    if shared.generation != generation {
        tracing::debug!(handle = %value, "discarding stale availability result");
        return;
    }

    shared.state.is_checking = false;
    match result {
        Ok(available) => {
            tracing::debug!(handle = %value, available, "handle availability resolved");
            shared.state.availability = Some(available);
        }
        Err(e) => {
            tracing::warn!(handle = %value, error = %e, "handle availability check failed");
            shared.state.availability = None;
            shared.state.check_failed = true;
        }
    }
    shared.publish();
}
