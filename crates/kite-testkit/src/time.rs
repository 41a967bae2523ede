//! Clocks that misbehave on purpose.

use async_trait::async_trait;
use kite_core::effects::{PhysicalTimeEffects, TimeError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Clock whose timers always fail without waiting.
#[derive(Debug, Default)]
pub struct StoppedClock {
    sleeps: AtomicUsize,
}

impl StoppedClock {
    /// Create a stopped clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sleeps requested so far.
    pub fn sleep_count(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhysicalTimeEffects for StoppedClock {
    async fn sleep_ms(&self, _ms: u64) -> Result<(), TimeError> {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        Err(TimeError::ServiceUnavailable)
    }
}
