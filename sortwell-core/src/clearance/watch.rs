//! Per-bin clearance state machine
//!
//! ```text
//! Unknown ──probe failed──▶ Disconnected
//!    │
//!    ├─above clear──▶ Clear
//!    ├─at/below full or no echo──▶ Full ──notified──▶ Waiting
//!    └─between thresholds──▶ Waiting
//!
//! Waiting ──above clear──▶ Clear
//! Waiting ──deadline──▶ TimedOut
//! any non-terminal ──interrupt──▶ Interrupted
//! ```

use crate::config::SensorConfig;
use crate::sensing::Reading;

use super::report::ClearanceStatus;

/// Bin supervision states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchState {
    /// Nothing measured yet
    Unknown,
    /// Bin confirmed empty
    Clear,
    /// Bin full; the operator has not been told yet
    Full,
    /// Waiting for the operator to empty the bin
    Waiting,
    TimedOut,
    Disconnected,
    Interrupted,
}

/// Inputs to the bin state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchEvent {
    /// Every probe attempt returned no echo
    ProbeFailed,
    /// Reading above the clear threshold
    AboveClear,
    /// Reading between the thresholds
    BetweenThresholds,
    /// Reading at or below the full threshold, or no echo
    AtOrBelowFull,
    /// The "bin full" notice has been issued
    Notified,
    /// Overall timeout elapsed
    Deadline,
    Interrupt,
}

impl WatchEvent {
    /// Classify a reading against a bin's thresholds
    pub fn from_reading(reading: Reading, config: &SensorConfig) -> Self {
        match reading {
            Reading::Distance(cm) if cm > config.clear_cm => WatchEvent::AboveClear,
            Reading::Distance(cm) if cm > config.full_cm => WatchEvent::BetweenThresholds,
            _ => WatchEvent::AtOrBelowFull,
        }
    }
}

impl WatchState {
    /// Terminal states end supervision of the bin
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WatchState::Clear
                | WatchState::TimedOut
                | WatchState::Disconnected
                | WatchState::Interrupted
        )
    }

    /// Status for a terminal state
    pub fn status(&self) -> Option<ClearanceStatus> {
        match self {
            WatchState::Clear => Some(ClearanceStatus::Cleared),
            WatchState::TimedOut => Some(ClearanceStatus::TimedOut),
            WatchState::Disconnected => Some(ClearanceStatus::Disconnected),
            WatchState::Interrupted => Some(ClearanceStatus::Interrupted),
            _ => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: WatchEvent) -> Self {
        use WatchEvent::*;
        use WatchState::*;

        match (self, event) {
            // Terminal states never move
            (s, _) if s.is_terminal() => s,

            (_, Interrupt) => Interrupted,

            // First contact
            (Unknown, ProbeFailed) => Disconnected,
            (Unknown, AboveClear) => Clear,
            (Unknown, AtOrBelowFull) => Full,
            (Unknown, BetweenThresholds) => Waiting,

            // Operator has been told
            (Full, Notified) => Waiting,
            (Full, AboveClear) => Clear,
            (Full, Deadline) => TimedOut,

            // Waiting loop; a single reading above clear is enough
            (Waiting, AboveClear) => Clear,
            (Waiting, Deadline) => TimedOut,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SensorConfig {
        SensorConfig::default()
    }

    #[test]
    fn test_reading_classification() {
        let c = config();
        assert_eq!(
            WatchEvent::from_reading(Reading::Distance(25.0), &c),
            WatchEvent::AboveClear
        );
        assert_eq!(
            WatchEvent::from_reading(Reading::Distance(20.0), &c),
            WatchEvent::BetweenThresholds
        );
        assert_eq!(
            WatchEvent::from_reading(Reading::Distance(15.0), &c),
            WatchEvent::AtOrBelowFull
        );
        assert_eq!(
            WatchEvent::from_reading(Reading::Invalid, &c),
            WatchEvent::AtOrBelowFull
        );
    }

    #[test]
    fn test_disconnected_never_waits() {
        let s = WatchState::Unknown.transition(WatchEvent::ProbeFailed);
        assert_eq!(s, WatchState::Disconnected);
        assert_eq!(s.transition(WatchEvent::BetweenThresholds), WatchState::Disconnected);
    }

    #[test]
    fn test_full_then_cleared() {
        let s = WatchState::Unknown.transition(WatchEvent::AtOrBelowFull);
        assert_eq!(s, WatchState::Full);
        let s = s.transition(WatchEvent::Notified);
        assert_eq!(s, WatchState::Waiting);
        // Still full: no second notice, keep waiting
        let s = s.transition(WatchEvent::AtOrBelowFull);
        assert_eq!(s, WatchState::Waiting);
        let s = s.transition(WatchEvent::AboveClear);
        assert_eq!(s, WatchState::Clear);
        assert_eq!(s.status(), Some(ClearanceStatus::Cleared));
    }

    #[test]
    fn test_deadline_while_waiting() {
        let s = WatchState::Unknown
            .transition(WatchEvent::BetweenThresholds)
            .transition(WatchEvent::Deadline);
        assert_eq!(s, WatchState::TimedOut);
    }

    #[test]
    fn test_interrupt_from_non_terminal() {
        for s in [WatchState::Unknown, WatchState::Full, WatchState::Waiting] {
            assert_eq!(s.transition(WatchEvent::Interrupt), WatchState::Interrupted);
        }
        // Terminal states are sticky
        assert_eq!(
            WatchState::Clear.transition(WatchEvent::Interrupt),
            WatchState::Clear
        );
    }

    #[test]
    fn test_non_terminal_has_no_status() {
        assert_eq!(WatchState::Waiting.status(), None);
        assert_eq!(WatchState::Unknown.status(), None);
    }
}
