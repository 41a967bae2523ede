//! Block List Workflow
//!
//! Owns the blocked-users list for the privacy settings screen and gates
//! unblock requests per user through a [`MutationGuard`].
//!
//! Under [`ApplyPolicy::Confirm`] the row disappears only after the backend
//! confirms; a failure needs no rollback. Under [`ApplyPolicy::Optimistic`]
//! the row disappears immediately and is put back at its old position if the
//! backend fails.

use crate::guards::{MutationGuard, Submission};
use crate::views::block_list::BlockListState;
use kite_core::effects::BlockEffects;
use kite_core::{ApplyPolicy, BlockedUser, KiteError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Default)]
struct Rows {
    users: Vec<BlockedUser>,
    loaded: bool,
    /// Bumped on every confirmed unblock
    generation: u64,
    /// Confirmed unblocks tagged with their generation; kept only while a
    /// refresh is outstanding
    unblocked: Vec<(u64, String)>,
    refreshing: usize,
    refresh_seq: u64,
    applied_seq: u64,
}

impl Rows {
    fn unblocked_since(&self, generation: u64, user_id: &str) -> bool {
        self.unblocked
            .iter()
            .any(|(g, id)| *g > generation && id == user_id)
    }
}

/// Registration of one outstanding refresh.
///
/// Records where the refresh started so its reply can be reconciled with
/// whatever happened while it was on the wire.
struct RefreshTicket<'a> {
    rows: &'a Mutex<Rows>,
    seq: u64,
    generation: u64,
}

impl<'a> RefreshTicket<'a> {
    fn begin(rows: &'a Mutex<Rows>) -> Self {
        let mut guard = rows.lock();
        guard.refreshing += 1;
        guard.refresh_seq += 1;
        let (seq, generation) = (guard.refresh_seq, guard.generation);
        drop(guard);
        Self {
            rows,
            seq,
            generation,
        }
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        let mut rows = self.rows.lock();
        rows.refreshing = rows.refreshing.saturating_sub(1);
        if rows.refreshing == 0 {
            rows.unblocked.clear();
        }
    }
}

/// Blocked users list with per-user unblock gating.
pub struct BlockList {
    service: Arc<dyn BlockEffects>,
    policy: ApplyPolicy,
    guard: MutationGuard<String>,
    rows: Mutex<Rows>,
    updates: watch::Sender<BlockListState>,
}

impl BlockList {
    /// Create an empty, unloaded list.
    pub fn new(service: Arc<dyn BlockEffects>, policy: ApplyPolicy) -> Self {
        let (updates, _) = watch::channel(BlockListState::default());
        Self {
            service,
            policy,
            guard: MutationGuard::new(),
            rows: Mutex::new(Rows::default()),
            updates,
        }
    }

    /// Seed the list, e.g. from a cached screen state.
    ///
    /// Seeded rows are not backend-confirmed: `loaded` stays false until the
    /// first successful [`BlockList::refresh`].
    #[must_use]
    pub fn with_users(self, users: Vec<BlockedUser>) -> Self {
        self.rows.lock().users = users;
        self.publish();
        self
    }

    /// Apply policy in effect.
    pub fn policy(&self) -> ApplyPolicy {
        self.policy
    }

    /// Reload the list from the backend. Returns the number of users.
    ///
    /// On failure the current list is kept. A reply never resurrects a user
    /// whose unblock was confirmed after the request went out, and a reply
    /// superseded by a later refresh is dropped.
    pub async fn refresh(&self) -> Result<usize> {
        let ticket = RefreshTicket::begin(&self.rows);
        let users = self.service.list_blocked_users().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to load blocked users");
            e
        })?;

        let count = {
            let mut rows = self.rows.lock();
            if ticket.seq < rows.applied_seq {
                tracing::debug!(seq = ticket.seq, "discarding superseded block list");
                return Ok(rows.users.len());
            }
            let fresh: Vec<BlockedUser> = users
                .into_iter()
                .filter(|u| !rows.unblocked_since(ticket.generation, &u.id))
                // Rows with an optimistic removal in flight stay hidden.
                .filter(|u| {
                    self.policy == ApplyPolicy::Confirm || !self.guard.is_busy(u.id.as_str())
                })
                .collect();
            rows.users = fresh;
            rows.loaded = true;
            rows.applied_seq = ticket.seq;
            rows.users.len()
        };
        self.publish();
        Ok(count)
    }

    /// Unblock `user_id`.
    ///
    /// A second call for the same user while the first is outstanding returns
    /// [`Submission::AlreadyInFlight`] without contacting the backend. Errors
    /// are returned to the caller and never retried.
    pub async fn unblock(&self, user_id: &str) -> Submission<(), KiteError> {
        let outcome = self
            .guard
            .submit(user_id.to_string(), |key| self.run_unblock(key))
            .await;
        if outcome.is_duplicate() {
            tracing::debug!(user_id = %user_id, "unblock already in flight; ignoring");
        }
        self.publish();
        outcome
    }

    /// Whether an unblock for `user_id` is outstanding.
    pub fn is_busy(&self, user_id: &str) -> bool {
        self.guard.is_busy(user_id)
    }

    /// Current state.
    pub fn snapshot(&self) -> BlockListState {
        let mut busy = self.guard.busy_keys();
        busy.sort();
        let rows = self.rows.lock();
        BlockListState {
            users: rows.users.clone(),
            busy,
            loaded: rows.loaded,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<BlockListState> {
        self.updates.subscribe()
    }

    async fn run_unblock(&self, user_id: String) -> Result<()> {
        let removed = match self.policy {
            ApplyPolicy::Optimistic => self.take_user(&user_id),
            ApplyPolicy::Confirm => None,
        };
        self.publish();

        match self.service.unblock_user(&user_id).await {
            Ok(()) => {
                self.confirm_unblocked(&user_id);
                tracing::info!(user_id = %user_id, "user unblocked");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "unblock failed");
                if let Some((index, user)) = removed {
                    self.restore_user(index, user);
                }
                Err(e)
            }
        }
    }

    fn take_user(&self, user_id: &str) -> Option<(usize, BlockedUser)> {
        let mut rows = self.rows.lock();
        let index = rows.users.iter().position(|u| u.id == user_id)?;
        Some((index, rows.users.remove(index)))
    }

    fn confirm_unblocked(&self, user_id: &str) {
        let mut rows = self.rows.lock();
        rows.users.retain(|u| u.id != user_id);
        rows.generation += 1;
        if rows.refreshing > 0 {
            let generation = rows.generation;
            rows.unblocked.push((generation, user_id.to_string()));
        }
    }

    fn restore_user(&self, index: usize, user: BlockedUser) {
        let mut rows = self.rows.lock();
        if rows.users.iter().any(|u| u.id == user.id) {
            return;
        }
        let index = index.min(rows.users.len());
        rows.users.insert(index, user);
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}

impl std::fmt::Debug for BlockList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockList")
            .field("policy", &self.policy)
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}
