//! Shared domain records.

use serde::{Deserialize, Serialize};

/// A user the current account has blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockedUser {
    /// Backend user identifier (the mutation key for unblocking)
    pub id: String,
    /// Public handle, without the leading `@`
    pub handle: String,
    /// Display name, if the user set one
    pub display_name: Option<String>,
    /// When the block was created (ms since epoch)
    pub blocked_at_ms: u64,
}

impl BlockedUser {
    /// Create a blocked-user record with only an id and handle.
    pub fn new(id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the block timestamp.
    #[must_use]
    pub fn with_blocked_at(mut self, blocked_at_ms: u64) -> Self {
        self.blocked_at_ms = blocked_at_ms;
        self
    }

    /// Name to show in lists: display name if non-empty, else `@handle`.
    pub fn label(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("@{}", self.handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_display_name() {
        let user = BlockedUser::new("u1", "alice").with_display_name("Alice");
        assert_eq!(user.label(), "Alice");
    }

    #[test]
    fn test_label_falls_back_to_handle() {
        let user = BlockedUser::new("u1", "alice").with_display_name("");
        assert_eq!(user.label(), "@alice");
        assert_eq!(BlockedUser::new("u2", "bob").label(), "@bob");
    }
}
