//! State machine definition

use super::events::Event;

/// Station states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Waiting for the operator trigger
    Idle,
    /// Trigger accepted, cycle about to start
    Armed,
    /// Verifying every bin is empty
    CheckingClearance,
    /// Waiting for the camera
    Capturing,
    /// Waiting for the classifier
    Classifying,
    /// Showing the category color
    Indicating,
    /// Storing the image
    Archiving,
    /// Stop requested; hardware released
    Stopped,
}

/// Why a cycle went back to idle early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    /// A bin timed out or its sensor is disconnected
    BinNotClear,
    /// Camera call failed
    CaptureFailed,
    /// Classifier call failed
    ClassifyFailed,
}

impl State {
    /// Check if a cycle is in progress
    pub fn in_cycle(&self) -> bool {
        !matches!(self, State::Idle | State::Stopped)
    }

    /// Stopped; no event leaves this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Stopped)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Stopped is final
            (Stopped, _) => Stopped,
            (_, Interrupted) => Stopped,

            (Idle, TriggerPressed) => Armed,
            (Armed, ClearanceStarted) => CheckingClearance,
            (CheckingClearance, AllBinsClear) => Capturing,
            (Capturing, CaptureComplete) => Classifying,
            // A malformed line still counts as classified ("unknown")
            (Classifying, Classified) => Indicating,
            (Indicating, IndicationComplete) => Archiving,
            (Archiving, ArchiveComplete) => Idle,
            (Archiving, ArchiveFailed) => Idle,

            // Any cycle stage may give up
            (s, CycleSkipped(_)) if s.in_cycle() => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
