//! In-memory block service.

use async_trait::async_trait;
use kite_core::effects::BlockEffects;
use kite_core::{BlockedUser, KiteError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Default)]
struct BlockState {
    users: Vec<BlockedUser>,
    failing: HashSet<String>,
    fail_listing: bool,
    latency_ms: u64,
    list_latency_ms: u64,
    unblock_calls: Vec<String>,
}

/// Block backend holding its list in memory.
///
/// `unblock_user` removes the user on success. Users registered with
/// [`MockBlockService::fail_unblock`] are rejected with a backend error.
///
/// Listing reads the list when the request arrives and delivers it after the
/// listing latency, so a reply can be older than an unblock that completes
/// while it is on the wire.
#[derive(Debug, Default)]
pub struct MockBlockService {
    state: Mutex<BlockState>,
}

impl MockBlockService {
    /// Create a service seeded with `users`.
    pub fn new(users: Vec<BlockedUser>) -> Self {
        Self {
            state: Mutex::new(BlockState {
                users,
                ..BlockState::default()
            }),
        }
    }

    /// Simulated round-trip time for unblock calls.
    #[must_use]
    pub fn with_latency_ms(self, ms: u64) -> Self {
        self.state.lock().latency_ms = ms;
        self
    }

    /// Simulated round-trip time for listing calls.
    #[must_use]
    pub fn with_list_latency_ms(self, ms: u64) -> Self {
        self.state.lock().list_latency_ms = ms;
        self
    }

    /// Change the listing round-trip time for subsequent calls.
    pub fn set_list_latency_ms(&self, ms: u64) {
        self.state.lock().list_latency_ms = ms;
    }

    /// Reject unblock requests for `user_id`.
    pub fn fail_unblock(&self, user_id: &str) {
        self.state.lock().failing.insert(user_id.to_string());
    }

    /// Accept unblock requests for `user_id` again.
    pub fn heal_unblock(&self, user_id: &str) {
        self.state.lock().failing.remove(user_id);
    }

    /// Make `list_blocked_users` fail.
    pub fn fail_listing(&self, fail: bool) {
        self.state.lock().fail_listing = fail;
    }

    /// User ids passed to `unblock_user`, in call order.
    pub fn unblock_calls(&self) -> Vec<String> {
        self.state.lock().unblock_calls.clone()
    }

    /// Number of `unblock_user` invocations for `user_id`.
    pub fn unblock_count(&self, user_id: &str) -> usize {
        self.state
            .lock()
            .unblock_calls
            .iter()
            .filter(|id| id.as_str() == user_id)
            .count()
    }

    /// Users the backend still considers blocked.
    pub fn remaining(&self) -> Vec<BlockedUser> {
        self.state.lock().users.clone()
    }
}

#[async_trait]
impl BlockEffects for MockBlockService {
    async fn list_blocked_users(&self) -> Result<Vec<BlockedUser>, KiteError> {
        let (reply, latency) = {
            let state = self.state.lock();
            let reply = if state.fail_listing {
                Err(KiteError::network("block list unavailable"))
            } else {
                Ok(state.users.clone())
            };
            (reply, state.list_latency_ms)
        };
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        reply
    }

    async fn unblock_user(&self, user_id: &str) -> Result<(), KiteError> {
        let latency = {
            let mut state = self.state.lock();
            state.unblock_calls.push(user_id.to_string());
            state.latency_ms
        };
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let mut state = self.state.lock();
        if state.failing.contains(user_id) {
            return Err(KiteError::backend(format!("unblock rejected for {user_id}")));
        }
        state.users.retain(|u| u.id != user_id);
        Ok(())
    }
}
