//! # View State
//!
//! Plain snapshot types read by frontends. Views hold no behaviour beyond
//! derived queries; workflows own the transitions.

pub mod block_list;
pub mod handle;
