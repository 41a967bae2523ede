//! Scripted handle availability backend.

use async_trait::async_trait;
use kite_core::effects::HandleAvailabilityEffects;
use kite_core::KiteError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Answer {
    Available(bool),
    Fail(String),
}

#[derive(Debug)]
struct Script {
    answers: HashMap<String, Answer>,
    latency_ms: HashMap<String, u64>,
    default_available: bool,
    default_latency_ms: u64,
    calls: Vec<String>,
}

/// Availability backend with per-handle answers, failures and latency.
///
/// Unscripted handles are available and answer immediately unless the
/// defaults are changed.
#[derive(Debug)]
pub struct ScriptedAvailability {
    script: Mutex<Script>,
}

impl Default for ScriptedAvailability {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedAvailability {
    /// Create a backend where every handle is available.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                answers: HashMap::new(),
                latency_ms: HashMap::new(),
                default_available: true,
                default_latency_ms: 0,
                calls: Vec::new(),
            }),
        }
    }

    /// Answer for handles without a scripted entry.
    #[must_use]
    pub fn with_default_available(self, available: bool) -> Self {
        self.script.lock().default_available = available;
        self
    }

    /// Latency for handles without a scripted latency.
    #[must_use]
    pub fn with_default_latency_ms(self, ms: u64) -> Self {
        self.script.lock().default_latency_ms = ms;
        self
    }

    /// Mark `handle` as taken.
    pub fn set_taken(&self, handle: &str) {
        self.set_available(handle, false);
    }

    /// Script the availability answer for `handle`.
    pub fn set_available(&self, handle: &str, available: bool) {
        self.script
            .lock()
            .answers
            .insert(handle.to_string(), Answer::Available(available));
    }

    /// Make checks for `handle` fail with a network error.
    pub fn fail(&self, handle: &str, message: &str) {
        self.script
            .lock()
            .answers
            .insert(handle.to_string(), Answer::Fail(message.to_string()));
    }

    /// Simulated round-trip time for `handle`.
    pub fn set_latency_ms(&self, handle: &str, ms: u64) {
        self.script.lock().latency_ms.insert(handle.to_string(), ms);
    }

    /// Handles checked so far, in dispatch order.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().calls.clone()
    }

    /// Number of checks dispatched so far.
    pub fn call_count(&self) -> usize {
        self.script.lock().calls.len()
    }
}

#[async_trait]
impl HandleAvailabilityEffects for ScriptedAvailability {
    async fn check_handle_availability(&self, handle: &str) -> Result<bool, KiteError> {
        let (answer, latency) = {
            let mut script = self.script.lock();
            script.calls.push(handle.to_string());
            let answer = script
                .answers
                .get(handle)
                .cloned()
                .unwrap_or(Answer::Available(script.default_available));
            let latency = script
                .latency_ms
                .get(handle)
                .copied()
                .unwrap_or(script.default_latency_ms);
            (answer, latency)
        };

        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        match answer {
            Answer::Available(available) => Ok(available),
            Answer::Fail(message) => Err(KiteError::network(message)),
        }
    }
}
