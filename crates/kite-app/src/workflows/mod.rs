//! # Workflows
//!
//! Stateful coordinators behind each surface. Workflows own transitions,
//! talk to collaborators through `kite_core::effects`, and publish view
//! snapshots over `tokio::sync::watch` channels.
//!
//! Locks are `parking_lot` mutexes and are never held across `.await`.

pub mod block_list;
pub mod handle;
