//! Effect traits
//!
//! Every side effect the client core performs goes through one of these
//! traits. Production implementations talk to the backend and the OS clock;
//! tests substitute scripted ones from `kite-testkit`.
//!
//! - [`PhysicalTimeEffects`]: sleeping for debounce delays
//! - [`HandleAvailabilityEffects`]: remote handle availability lookups
//! - [`BlockEffects`]: listing and lifting user blocks

pub mod availability;
pub mod block;
pub mod time;

pub use availability::HandleAvailabilityEffects;
pub use block::BlockEffects;
pub use time::{PhysicalTimeEffects, RealTimeHandler, TimeError};
