//! Station event reporting
//!
//! The core does not log. It reports what happens as [`Notice`]s to an
//! [`EventSink`]; the firmware turns them into defmt log lines.

use crate::clearance::ExitCode;
use crate::sensing::Reading;
use crate::traits::{CollaboratorError, Color, ImageHandle};

/// Something worth telling the operator about
///
/// Bins are referred to by their index in the sensor array.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice<'a> {
    /// Trigger accepted, cycle starting
    Armed,
    /// A bin sensor failed every probe attempt
    BinDisconnected { bin: u8 },
    /// A bin is full (or gave no echo) and must be emptied
    BinFull { bin: u8, reading: Reading },
    /// Still waiting for a bin to be emptied
    StillWaiting { bin: u8, reading: Reading, elapsed_ms: u32 },
    /// A bin read clear
    BinClear { bin: u8, reading: Reading, elapsed_ms: u32 },
    /// A bin never cleared within the overall timeout
    BinTimedOut { bin: u8, elapsed_ms: u32 },
    /// Clearance cycle finished
    ClearanceFinished { exit_code: ExitCode, capture_allowed: bool },
    /// Image captured
    Captured { image: ImageHandle },
    /// Classification parsed; `known` is false when the category has no color
    Classified { category: &'a str, known: bool },
    /// Classification line did not have the expected shape
    ClassificationUnparsable { raw: &'a str },
    /// Indicator lit
    Indicating { color: Color },
    /// Image archived
    Archived { folder: &'a str, name: &'a str },
    /// A collaborator call failed
    CollaboratorFailed { stage: Stage, error: CollaboratorError },
    /// Stop requested, station shutting down
    Interrupted,
}

/// Cycle stage that talks to a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    Capture,
    Classify,
    Archive,
}

/// Receives station notices
pub trait EventSink {
    fn record(&mut self, notice: Notice<'_>);
}

/// Discards every notice
impl EventSink for () {
    fn record(&mut self, _notice: Notice<'_>) {}
}
