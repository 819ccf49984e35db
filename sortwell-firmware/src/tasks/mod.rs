//! Firmware tasks
//!
//! The station loop is one blocking control flow; it runs on the main
//! executor task.

pub mod station;

pub use station::run_station;
