//! Handle availability lookups.

use crate::Result;
use async_trait::async_trait;

/// Remote lookup of whether a normalized handle can be claimed.
///
/// Implementations return `Ok(true)` when the handle is free, `Ok(false)` when
/// it is taken, and `Err` on transport or server failure. No timeout is
/// imposed by callers; that belongs to the implementation's transport.
#[async_trait]
pub trait HandleAvailabilityEffects: Send + Sync {
    /// Check availability of an already normalized handle.
    async fn check_handle_availability(&self, handle: &str) -> Result<bool>;
}

/// Blanket implementation for Arc<T> where T: HandleAvailabilityEffects
#[async_trait]
impl<T: HandleAvailabilityEffects + ?Sized> HandleAvailabilityEffects for std::sync::Arc<T> {
    async fn check_handle_availability(&self, handle: &str) -> Result<bool> {
        (**self).check_handle_availability(handle).await
    }
}
