//! # Kite Core
//!
//! Foundation crate for the Kite client. It holds the pieces every other
//! crate agrees on:
//!
//! - [`KiteError`]: the unified error type returned by collaborators and workflows
//! - [`effects`]: the traits through which the client reaches the backend and the clock
//! - [`config`]: client tuning (debounce delay, handle rules, apply policy)
//! - [`types`]: small domain records shared across crates
//!
//! This crate has no UI and no runtime state of its own.

#![forbid(unsafe_code)]

pub mod config;
pub mod effects;
pub mod errors;
pub mod types;

pub use config::{ApplyPolicy, BlockListConfig, ClientConfig, HandleRules};
pub use errors::{KiteError, Result};
pub use types::BlockedUser;
