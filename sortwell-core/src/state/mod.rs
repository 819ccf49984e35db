//! Station state machine
//!
//! The station runs one cycle at a time: trigger, clearance check, capture,
//! classify, indicate, archive. The state machine is explicit, finite and
//! deterministic; the controller in [`crate::station`] feeds it events.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{SkipReason, State};
