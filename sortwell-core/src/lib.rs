//! Board-agnostic core logic for the waste-sorting station
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Configuration types and the on-device TOML parser
//! - Ultrasonic ranging math and the bin sensor array
//! - Bin clearance monitoring (probe, wait-until-clear, timeouts)
//! - Classification response parsing and the indicator color table
//! - Archive naming
//! - The station state machine and the orchestration controller
//! - Traits for sensors, indicator, operator inputs and collaborators

#![no_std]
#![deny(unsafe_code)]

pub mod archive;
pub mod classify;
pub mod clearance;
pub mod config;
pub mod indicate;
pub mod sensing;
pub mod state;
pub mod station;
pub mod traits;
