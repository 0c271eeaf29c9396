//! Link state machine
//!
//! Tracks where the receiver is in its connect / receive / render cycle.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ErrorKind, State};
