//! Bin clearance monitoring
//!
//! Before anything is captured every monitored bin must be confirmed empty.
//! Each bin runs through a small state machine ([`watch::WatchState`]); the
//! [`monitor::ClearanceMonitor`] drives those machines against the sensors
//! and the clock and condenses the result into a [`report::ClearanceReport`].

pub mod monitor;
pub mod report;
pub mod watch;

pub use monitor::ClearanceMonitor;
pub use report::{ClearanceOutcome, ClearanceReport, ClearanceStatus, ExitCode};
pub use watch::{WatchEvent, WatchState};
