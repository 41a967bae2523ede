//! # Kite Testkit
//!
//! Deterministic stand-ins for the backend collaborators. Latency is simulated
//! with `tokio::time::sleep`, so tests should run on a paused runtime
//! (`#[tokio::test(start_paused = true)]`) to make ordering exact.

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod availability;
pub mod block;
pub mod fixtures;
pub mod time;

pub use availability::ScriptedAvailability;
pub use block::MockBlockService;
pub use time::StoppedClock;
