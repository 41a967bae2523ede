//! Test fixtures.

use kite_core::BlockedUser;

/// `count` blocked users with ids `u1..=uN` and handles `user1..=userN`.
pub fn blocked_users(count: usize) -> Vec<BlockedUser> {
    (1..=count)
        .map(|n| {
            BlockedUser::new(format!("u{n}"), format!("user{n}"))
                .with_blocked_at(1_700_000_000_000 + n as u64)
        })
        .collect()
}
