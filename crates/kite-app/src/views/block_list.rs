//! # Block List View State

use kite_core::BlockedUser;
use serde::{Deserialize, Serialize};

/// Blocked users screen state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockListState {
    /// Blocked users in backend order
    pub users: Vec<BlockedUser>,
    /// Ids with an unblock request in flight, sorted
    pub busy: Vec<String>,
    /// Whether the list has been loaded from the backend at least once
    pub loaded: bool,
}

impl BlockListState {
    /// Get user by ID
    pub fn user(&self, id: &str) -> Option<&BlockedUser> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Whether the row for `id` should be disabled
    pub fn is_busy(&self, id: &str) -> bool {
        self.busy.iter().any(|b| b == id)
    }

    /// Number of blocked users
    pub fn count(&self) -> usize {
        self.users.len()
    }

    /// True when nothing is blocked
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
