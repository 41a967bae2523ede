//! Keyed in-flight guards for mutating requests.
//!
//! A [`MutationGuard`] admits at most one outstanding mutation per key. The
//! key enters the in-flight set synchronously in [`MutationGuard::try_begin`],
//! before any request is issued, so a second submission for the same key
//! cannot slip in ahead of the first. Release is tied to the returned
//! [`InFlightPermit`]: dropping it removes the key exactly once, whether the
//! mutation succeeded, failed, was cancelled, or panicked.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for the key set because the lock is never held
//! across `.await` points and every critical section is a single set op.

use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

/// Outcome of [`MutationGuard::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Submission<T, E> {
    /// A mutation for this key was already outstanding; nothing was invoked
    AlreadyInFlight,
    /// The mutation ran to completion
    Completed(Result<T, E>),
}

impl<T, E> Submission<T, E> {
    /// True if the submission was dropped as a duplicate.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::AlreadyInFlight)
    }

    /// True if the mutation ran and succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(Ok(_)))
    }

    /// The mutation result, or `None` for a duplicate.
    pub fn into_result(self) -> Option<Result<T, E>> {
        match self {
            Self::AlreadyInFlight => None,
            Self::Completed(result) => Some(result),
        }
    }
}

/// Per-key in-flight tracker.
///
/// Clones share the same key set.
#[derive(Debug)]
pub struct MutationGuard<K: Eq + Hash> {
    in_flight: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> Clone for MutationGuard<K> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<K: Eq + Hash> Default for MutationGuard<K> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl<K: Eq + Hash + Clone> MutationGuard<K> {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight, or return `None` if it already is.
    pub fn try_begin(&self, key: K) -> Option<InFlightPermit<K>> {
        if !self.in_flight.lock().insert(key.clone()) {
            return None;
        }
        Some(InFlightPermit {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Whether a mutation for `key` is outstanding.
    pub fn is_busy<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.in_flight.lock().contains(key)
    }

    /// Keys currently in flight, in no particular order.
    pub fn busy_keys(&self) -> Vec<K> {
        self.in_flight.lock().iter().cloned().collect()
    }

    /// Number of outstanding mutations.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Run `op` for `key` unless a mutation for `key` is already outstanding.
    ///
    /// `op` is invoked only after the key is registered, and the key is
    /// released as the final step regardless of outcome. A failed mutation
    /// leaves no trace; the key can be resubmitted immediately.
    pub async fn submit<F, Fut, T, E>(&self, key: K, op: F) -> Submission<T, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(permit) = self.try_begin(key) else {
            return Submission::AlreadyInFlight;
        };
        let result = op(permit.key().clone()).await;
        drop(permit);
        Submission::Completed(result)
    }
}

/// Scoped registration of one in-flight key.
///
/// Dropping the permit releases the key.
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the key"]
pub struct InFlightPermit<K: Eq + Hash> {
    key: K,
    in_flight: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> InFlightPermit<K> {
    /// The key this permit holds.
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash> Drop for InFlightPermit<K> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[test]
    fn test_try_begin_rejects_duplicate() {
        let guard: MutationGuard<String> = MutationGuard::new();
        let permit = guard.try_begin("u1".into()).unwrap();
        assert!(guard.is_busy("u1"));
        assert!(guard.try_begin("u1".into()).is_none());

        // Other keys stay interactive
        let other = guard.try_begin("u2".into()).unwrap();
        assert_eq!(guard.in_flight_count(), 2);

        drop(permit);
        assert!(!guard.is_busy("u1"));
        assert!(guard.is_busy("u2"));
        drop(other);
        assert_eq!(guard.in_flight_count(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let guard: MutationGuard<u32> = MutationGuard::new();
        let clone = guard.clone();
        let _permit = guard.try_begin(7).unwrap();
        assert!(clone.is_busy(&7));
        assert!(clone.try_begin(7).is_none());
    }

    #[tokio::test]
    async fn test_submit_twice_invokes_once() {
        let guard: MutationGuard<String> = MutationGuard::new();
        let calls = AtomicUsize::new(0);
        let (tx, rx) = oneshot::channel::<()>();

        let first = guard.submit("u1".into(), |_| async {
            calls.fetch_add(1, Ordering::SeqCst);
            rx.await.ok();
            Ok::<_, String>(())
        });
        let second = async {
            // Runs once `first` is parked on the channel
            tokio::task::yield_now().await;
            let outcome = guard
                .submit("u1".into(), |_| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(())
                })
                .await;
            tx.send(()).ok();
            outcome
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_success());
        assert!(second.is_duplicate());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!guard.is_busy("u1"));
    }

    #[tokio::test]
    async fn test_failure_releases_key_and_allows_resubmit() {
        let guard: MutationGuard<String> = MutationGuard::new();
        let outcome = guard
            .submit("u1".into(), |_| async { Err::<(), _>("boom") })
            .await;
        assert_eq!(outcome, Submission::Completed(Err("boom")));
        assert!(!guard.is_busy("u1"));

        let retry = guard
            .submit("u1".into(), |_| async { Ok::<_, &str>(()) })
            .await;
        assert!(retry.is_success());
    }

    #[tokio::test]
    async fn test_panic_in_mutation_releases_key() {
        let guard: MutationGuard<String> = MutationGuard::new();
        async fn explode(_key: String) -> Result<(), ()> {
            panic!("mutation exploded")
        }

        let result = AssertUnwindSafe(guard.submit("u1".into(), explode))
            .catch_unwind()
            .await;

        assert!(result.is_err());
        assert!(!guard.is_busy("u1"));
    }

    #[tokio::test]
    async fn test_cancelled_submission_releases_key() {
        let guard: MutationGuard<String> = MutationGuard::new();
        {
            let pending = guard.submit("u1".into(), |_| futures::future::pending::<Result<(), ()>>());
            futures::pin_mut!(pending);
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert!(guard.is_busy("u1"));
        }
        assert!(!guard.is_busy("u1"));
    }
}
