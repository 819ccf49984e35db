//! Station controller
//!
//! Sequences one cycle at a time:
//!
//! ```text
//! Idle ──trigger──▶ Armed ──▶ CheckingClearance ──all clear──▶ Capturing
//!   ▲                               │                              │
//!   │                          not clear                      captured
//!   │                               ▼                              ▼
//!   ├──────────────────────────── skip ◀──failure── Classifying ◀──┘
//!   │                                                   │
//!   │                                              classified
//!   │                                                   ▼
//!   └──── archived / archive failed ── Archiving ◀── Indicating
//! ```
//!
//! A stop request seen in any waiting loop turns the indicator off and ends
//! the run with [`ExitCode::Interrupted`].

use heapless::String;
use sortwell_hal::Clock;

use crate::archive::{folder_for, ArchivePath};
use crate::classify::{ClassificationResult, MAX_CATEGORY_LEN};
use crate::clearance::{ClearanceMonitor, ClearanceReport, ExitCode};
use crate::config::StationConfig;
use crate::indicate::{HoldEnd, IndicatorDriver};
use crate::sensing::SensorArray;
use crate::state::{Event, SkipReason, State};
use crate::traits::{
    Archive, Camera, Classifier, CollaboratorError, EventSink, ImageHandle, Indicator, Interrupt,
    Notice, RangeSensor, Stage, Trigger,
};

/// An image taken after a successful clearance check
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureSession {
    pub image: ImageHandle,
    /// Monotonic capture time, µs
    pub taken_at_us: u64,
    /// The clearance check that allowed this capture
    pub clearance: ClearanceReport,
}

/// How one cycle ended
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Classified and indicated; `archived` is None if storing failed
    Completed {
        category: String<MAX_CATEGORY_LEN>,
        archived: Option<ArchivePath>,
    },
    Skipped(SkipReason),
    Interrupted,
}

/// Everything the station owns, handed in at start and back at shutdown
pub struct StationParts<S, T, I, D, X, C, E> {
    pub sensors: SensorArray<S>,
    pub trigger: T,
    pub interrupt: I,
    pub indicator: D,
    /// Camera, classifier and archive
    pub companion: X,
    pub clock: C,
    pub sink: E,
}

/// Station controller
pub struct Station<'a, S, T, I, D, X, C, E> {
    config: &'a StationConfig,
    sensors: SensorArray<S>,
    trigger: T,
    interrupt: I,
    indicator: IndicatorDriver<D>,
    companion: X,
    clock: C,
    sink: E,
    state: State,
}

impl<'a, S, T, I, D, X, C, E> Station<'a, S, T, I, D, X, C, E>
where
    S: RangeSensor,
    T: Trigger,
    I: Interrupt,
    D: Indicator,
    X: Camera + Classifier + Archive,
    C: Clock,
    E: EventSink,
{
    pub fn new(config: &'a StationConfig, parts: StationParts<S, T, I, D, X, C, E>) -> Self {
        Self {
            config,
            sensors: parts.sensors,
            trigger: parts.trigger,
            interrupt: parts.interrupt,
            indicator: IndicatorDriver::new(parts.indicator, config.indicator.display_ms),
            companion: parts.companion,
            clock: parts.clock,
            sink: parts.sink,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn sensors(&self) -> &SensorArray<S> {
        &self.sensors
    }

    /// Serve cycles until a stop is requested
    pub fn run(&mut self) -> ExitCode {
        loop {
            if !self.wait_for_trigger() {
                self.stop();
                return ExitCode::Interrupted;
            }
            self.run_cycle();
            if self.state.is_terminal() {
                return ExitCode::Interrupted;
            }
        }
    }

    /// Block until a debounced trigger press
    ///
    /// Returns false if a stop was requested instead.
    pub fn wait_for_trigger(&mut self) -> bool {
        loop {
            if self.interrupt.is_requested() {
                return false;
            }
            if self.trigger.poll_pressed() {
                return true;
            }
            self.clock.delay_ms(self.config.trigger.poll_ms);
        }
    }

    /// Run one cycle from an accepted trigger back to idle
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.apply(Event::TriggerPressed);
        self.sink.record(Notice::Armed);

        let session = match self.check_and_capture() {
            Ok(session) => session,
            Err(outcome) => return outcome,
        };

        let result = match self.companion.classify(session.image) {
            Ok(line) => ClassificationResult::parse(&line),
            Err(error) => return self.skip(SkipReason::ClassifyFailed, Stage::Classify, error),
        };
        if !result.well_formed {
            self.sink
                .record(Notice::ClassificationUnparsable { raw: &result.raw });
        }
        self.sink.record(Notice::Classified {
            category: &result.category,
            known: result.is_known(),
        });
        self.apply(Event::Classified);

        let command = self.indicator.command_for(&result.category);
        self.sink.record(Notice::Indicating {
            color: command.color,
        });
        let hold = self.indicator.show(
            command,
            &self.clock,
            &mut self.interrupt,
            self.config.clearance.poll_slice_ms,
        );
        if hold == HoldEnd::Interrupted {
            self.stop();
            return CycleOutcome::Interrupted;
        }
        self.apply(Event::IndicationComplete);

        let archived = match self.archive(&session, &result.category) {
            Ok(path) => {
                self.sink.record(Notice::Archived {
                    folder: &path.folder,
                    name: &path.name,
                });
                self.apply(Event::ArchiveComplete);
                Some(path)
            }
            Err(error) => {
                self.sink.record(Notice::CollaboratorFailed {
                    stage: Stage::Archive,
                    error,
                });
                self.apply(Event::ArchiveFailed);
                None
            }
        };

        CycleOutcome::Completed {
            category: result.category,
            archived,
        }
    }

    /// Release the hardware, indicator dark
    pub fn into_parts(self) -> StationParts<S, T, I, D, X, C, E> {
        StationParts {
            sensors: self.sensors,
            trigger: self.trigger,
            interrupt: self.interrupt,
            indicator: self.indicator.into_inner(),
            companion: self.companion,
            clock: self.clock,
            sink: self.sink,
        }
    }

    /// Clearance check then capture
    ///
    /// On error the cycle is over and the state is already Idle or Stopped.
    fn check_and_capture(&mut self) -> Result<CaptureSession, CycleOutcome> {
        self.apply(Event::ClearanceStarted);
        let report = ClearanceMonitor::new(&self.config.clearance, &self.clock).check(
            &mut self.sensors,
            &mut self.interrupt,
            &mut self.sink,
        );

        if report.was_interrupted() || self.interrupt.is_requested() {
            self.stop();
            return Err(CycleOutcome::Interrupted);
        }
        if !report.capture_allowed {
            self.apply(Event::CycleSkipped(SkipReason::BinNotClear));
            return Err(CycleOutcome::Skipped(SkipReason::BinNotClear));
        }
        self.apply(Event::AllBinsClear);

        match self.companion.capture() {
            Ok(image) => {
                self.sink.record(Notice::Captured { image });
                self.apply(Event::CaptureComplete);
                Ok(CaptureSession {
                    image,
                    taken_at_us: self.clock.now_us(),
                    clearance: report,
                })
            }
            Err(error) => Err(self.skip(SkipReason::CaptureFailed, Stage::Capture, error)),
        }
    }

    fn archive(
        &mut self,
        session: &CaptureSession,
        category: &str,
    ) -> Result<ArchivePath, CollaboratorError> {
        let folder = folder_for(category);
        let existing = self.companion.count_items(&folder)?;
        let path = ArchivePath::next_in(category, existing).ok_or(CollaboratorError::ArchiveFull)?;
        self.companion.store(session.image, &path)?;
        Ok(path)
    }

    fn skip(&mut self, reason: SkipReason, stage: Stage, error: CollaboratorError) -> CycleOutcome {
        self.sink.record(Notice::CollaboratorFailed { stage, error });
        self.indicator.off();
        self.apply(Event::CycleSkipped(reason));
        CycleOutcome::Skipped(reason)
    }

    fn stop(&mut self) {
        self.indicator.off();
        self.apply(Event::Interrupted);
        self.sink.record(Notice::Interrupted);
    }

    fn apply(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }
}
