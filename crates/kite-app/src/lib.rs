//! # Kite App - Portable Client Core
//!
//! Headless state and coordination logic shared by every Kite frontend.
//! Nothing here renders; frontends read snapshots (or subscribe to them) and
//! call the imperative entry points.
//!
//! ## Surfaces
//!
//! - [`HandleValidator`]: debounced, race-free handle availability checking
//! - [`BlockList`]: blocked users with per-user in-flight unblock gating
//!
//! Both are created when their screen mounts (see [`AppCore`]) and dropped
//! when it unmounts; pending timers are aborted and late results abandoned.
//!
//! ## Example
//!
//! ```rust,ignore
//! let core = AppCore::new(config, availability_backend, block_backend)?;
//! let validator = core.handle_validator();
//! validator.on_input_change("My-Name!");
//! // ... 500 ms later the check runs for "myname"
//! if validator.is_ready() { /* enable "Continue" */ }
//! ```

#![forbid(unsafe_code)]

pub mod app_core;
pub mod errors;
pub mod guards;
pub mod logging;
pub mod views;
pub mod workflows;

pub use app_core::AppCore;
pub use errors::ErrorCategory;
pub use guards::{InFlightPermit, MutationGuard, Submission};
pub use views::block_list::BlockListState;
pub use views::handle::{HandleFormatError, HandleStatus, HandleValidationState};
pub use workflows::block_list::BlockList;
pub use workflows::handle::HandleValidator;
