//! User block management.

use crate::{BlockedUser, Result};
use async_trait::async_trait;

/// Backend operations on the current account's block list.
#[async_trait]
pub trait BlockEffects: Send + Sync {
    /// Fetch the users currently blocked by this account.
    async fn list_blocked_users(&self) -> Result<Vec<BlockedUser>>;

    /// Lift the block on `user_id`.
    async fn unblock_user(&self, user_id: &str) -> Result<()>;
}

/// Blanket implementation for Arc<T> where T: BlockEffects
#[async_trait]
impl<T: BlockEffects + ?Sized> BlockEffects for std::sync::Arc<T> {
    async fn list_blocked_users(&self) -> Result<Vec<BlockedUser>> {
        (**self).list_blocked_users().await
    }

    async fn unblock_user(&self, user_id: &str) -> Result<()> {
        (**self).unblock_user(user_id).await
    }
}
