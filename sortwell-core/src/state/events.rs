//! Events that trigger state transitions

use super::machine::SkipReason;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Operator events
    /// Debounced trigger press accepted
    TriggerPressed,
    /// Stop input asserted
    Interrupted,

    // Cycle progress
    /// Clearance monitor started on the sensor array
    ClearanceStarted,
    /// Clearance verdict allows capture
    AllBinsClear,
    /// Image captured
    CaptureComplete,
    /// Classification line received and parsed
    Classified,
    /// Indicator hold elapsed and indicator turned off
    IndicationComplete,
    /// Image stored in the archive
    ArchiveComplete,
    /// Archive call failed; logged and ignored
    ArchiveFailed,

    /// The cycle cannot continue
    CycleSkipped(SkipReason),
}
