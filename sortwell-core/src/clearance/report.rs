//! Clearance results

use heapless::Vec;

use crate::config::MAX_SENSORS;
use crate::sensing::Reading;

/// Terminal status of one bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClearanceStatus {
    Cleared,
    TimedOut,
    Disconnected,
    /// Stop requested while this bin was being checked
    Interrupted,
}

impl ClearanceStatus {
    /// Exit code this status maps to
    pub fn exit_code(self) -> ExitCode {
        match self {
            ClearanceStatus::Cleared => ExitCode::AllClear,
            ClearanceStatus::TimedOut => ExitCode::Timeout,
            ClearanceStatus::Disconnected => ExitCode::Disconnected,
            ClearanceStatus::Interrupted => ExitCode::Interrupted,
        }
    }
}

/// Result for one bin
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClearanceOutcome {
    /// Index in the sensor array
    pub bin: u8,
    pub status: ClearanceStatus,
    /// Time spent waiting after the first reading
    pub elapsed_ms: u32,
    pub last_reading: Reading,
}

/// Process-style result codes for a clearance check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ExitCode {
    /// Every monitored bin cleared
    AllClear = 0,
    /// At least one bin failed to clear before the timeout
    Timeout = 1,
    /// Unexpected internal error
    Internal = 2,
    /// A sensor was detected disconnected
    Disconnected = 3,
    /// Interrupted by the operator
    Interrupted = 130,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::AllClear
    }
}

/// Outcome of one clearance cycle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClearanceReport {
    /// Outcomes in the order bins finished; aborted cycles stop early
    pub outcomes: Vec<ClearanceOutcome, MAX_SENSORS>,
    pub exit_code: ExitCode,
    /// Whether capture may go ahead
    pub capture_allowed: bool,
}

impl ClearanceReport {
    /// Report for a check that could not run at all
    pub fn internal_error() -> Self {
        Self {
            outcomes: Vec::new(),
            exit_code: ExitCode::Internal,
            capture_allowed: false,
        }
    }

    /// First bin that did not clear
    pub fn first_failure(&self) -> Option<&ClearanceOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.status != ClearanceStatus::Cleared)
    }

    pub fn was_interrupted(&self) -> bool {
        self.exit_code == ExitCode::Interrupted
    }
}
