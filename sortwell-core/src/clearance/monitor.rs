//! Clearance supervision loop
//!
//! Drives one [`WatchState`] machine per bin. All waiting is done with
//! short sleeps on the [`Clock`]; the stop input is sampled before every
//! slice, so shutdown latency is bounded by `poll_slice_ms`.

use heapless::Vec;
use sortwell_hal::Clock;

use crate::config::{ClearanceMode, ClearancePolicy, TimeoutPolicy, MAX_SENSORS};
use crate::sensing::{Bin, Reading, SensorArray};
use crate::traits::{EventSink, Interrupt, Notice, RangeSensor};

use super::report::{ClearanceOutcome, ClearanceReport, ClearanceStatus, ExitCode};
use super::watch::{WatchEvent, WatchState};

/// Supervision state for one bin
struct Tracker {
    bin: u8,
    state: WatchState,
    /// Time of the first reading; elapsed wait is measured from here
    started_us: u64,
    last: Reading,
}

/// Runs clearance cycles over a sensor array
pub struct ClearanceMonitor<'a, C> {
    policy: &'a ClearancePolicy,
    clock: C,
}

impl<'a, C: Clock> ClearanceMonitor<'a, C> {
    pub fn new(policy: &'a ClearancePolicy, clock: C) -> Self {
        Self { policy, clock }
    }

    /// Check every bin in the array
    ///
    /// Blocks until every bin reaches a terminal state or the cycle is
    /// aborted by a failure the policy does not tolerate.
    pub fn check<S, I, E>(
        &self,
        array: &mut SensorArray<S>,
        interrupt: &mut I,
        sink: &mut E,
    ) -> ClearanceReport
    where
        S: RangeSensor,
        I: Interrupt,
        E: EventSink,
    {
        let report = if array.is_empty() {
            ClearanceReport::internal_error()
        } else {
            let outcomes = match self.policy.mode {
                ClearanceMode::Sequential => self.run_sequential(array, interrupt, sink),
                ClearanceMode::Interleaved => self.run_interleaved(array, interrupt, sink),
            };
            self.conclude(outcomes)
        };

        sink.record(Notice::ClearanceFinished {
            exit_code: report.exit_code,
            capture_allowed: report.capture_allowed,
        });
        report
    }

    /// One bin at a time; the next bin starts only after the previous one ended
    fn run_sequential<S, I, E>(
        &self,
        array: &mut SensorArray<S>,
        interrupt: &mut I,
        sink: &mut E,
    ) -> Vec<ClearanceOutcome, MAX_SENSORS>
    where
        S: RangeSensor,
        I: Interrupt,
        E: EventSink,
    {
        let mut outcomes = Vec::new();

        for (index, bin) in array.iter_mut().enumerate() {
            let mut tracker = self.start(index as u8, bin, interrupt, sink);

            let status = loop {
                if let Some(status) = tracker.state.status() {
                    break status;
                }
                if self.pause(self.next_pause_ms(&tracker), interrupt) {
                    tracker.state = tracker.state.transition(WatchEvent::Interrupt);
                } else {
                    self.tick(&mut tracker, bin, sink);
                }
            };

            let _ = outcomes.push(self.outcome(&tracker, status));
            if !self.may_continue(status) {
                break;
            }
        }

        outcomes
    }

    /// Probe every bin first, then poll the waiting ones round-robin
    ///
    /// Each bin keeps its own timeout window.
    fn run_interleaved<S, I, E>(
        &self,
        array: &mut SensorArray<S>,
        interrupt: &mut I,
        sink: &mut E,
    ) -> Vec<ClearanceOutcome, MAX_SENSORS>
    where
        S: RangeSensor,
        I: Interrupt,
        E: EventSink,
    {
        let mut outcomes = Vec::new();
        let mut pending: Vec<Tracker, MAX_SENSORS> = Vec::new();

        for (index, bin) in array.iter_mut().enumerate() {
            let tracker = self.start(index as u8, bin, interrupt, sink);
            match tracker.state.status() {
                Some(status) => {
                    let _ = outcomes.push(self.outcome(&tracker, status));
                    if !self.may_continue(status) {
                        return outcomes;
                    }
                }
                None => {
                    let _ = pending.push(tracker);
                }
            }
        }

        while !pending.is_empty() {
            let wait = pending
                .iter()
                .map(|t| self.next_pause_ms(t))
                .min()
                .unwrap_or(0);

            if self.pause(wait, interrupt) {
                for tracker in pending.iter_mut() {
                    tracker.state = tracker.state.transition(WatchEvent::Interrupt);
                    let _ = outcomes.push(self.outcome(tracker, ClearanceStatus::Interrupted));
                }
                return outcomes;
            }

            for (index, bin) in array.iter_mut().enumerate() {
                let Some(pos) = pending.iter().position(|t| t.bin as usize == index) else {
                    continue;
                };

                let status = {
                    let tracker = &mut pending[pos];
                    self.tick(tracker, bin, sink);
                    tracker.state.status()
                };

                if let Some(status) = status {
                    let tracker = pending.remove(pos);
                    let _ = outcomes.push(self.outcome(&tracker, status));
                    if !self.may_continue(status) {
                        return outcomes;
                    }
                }
            }
        }

        outcomes
    }

    /// Probe the sensor and take the first reading
    fn start<S, I, E>(&self, index: u8, bin: &mut Bin<S>, interrupt: &mut I, sink: &mut E) -> Tracker
    where
        S: RangeSensor,
        I: Interrupt,
        E: EventSink,
    {
        let mut tracker = Tracker {
            bin: index,
            state: WatchState::Unknown,
            started_us: self.clock.now_us(),
            last: Reading::Invalid,
        };

        if interrupt.is_requested() {
            tracker.state = tracker.state.transition(WatchEvent::Interrupt);
            return tracker;
        }

        if !self.probe(&mut bin.sensor) {
            tracker.state = tracker.state.transition(WatchEvent::ProbeFailed);
            sink.record(Notice::BinDisconnected { bin: index });
            return tracker;
        }

        tracker.last = bin.sensor.measure_with_retry(bin.config.attempts);
        tracker.started_us = self.clock.now_us();
        tracker.state = tracker
            .state
            .transition(WatchEvent::from_reading(tracker.last, &bin.config));

        match tracker.state {
            WatchState::Full => {
                sink.record(Notice::BinFull {
                    bin: index,
                    reading: tracker.last,
                });
                tracker.state = tracker.state.transition(WatchEvent::Notified);
            }
            WatchState::Clear => sink.record(Notice::BinClear {
                bin: index,
                reading: tracker.last,
                elapsed_ms: 0,
            }),
            _ => sink.record(Notice::StillWaiting {
                bin: index,
                reading: tracker.last,
                elapsed_ms: 0,
            }),
        }

        tracker
    }

    /// One recheck of a waiting bin
    fn tick<S: RangeSensor, E: EventSink>(&self, tracker: &mut Tracker, bin: &mut Bin<S>, sink: &mut E) {
        let elapsed_ms = self.elapsed_ms(tracker);
        if elapsed_ms >= self.policy.timeout_ms {
            tracker.state = tracker.state.transition(WatchEvent::Deadline);
            sink.record(Notice::BinTimedOut {
                bin: tracker.bin,
                elapsed_ms,
            });
            return;
        }

        tracker.last = bin.sensor.measure_with_retry(bin.config.attempts);
        tracker.state = tracker
            .state
            .transition(WatchEvent::from_reading(tracker.last, &bin.config));

        let elapsed_ms = self.elapsed_ms(tracker);
        if tracker.state == WatchState::Clear {
            sink.record(Notice::BinClear {
                bin: tracker.bin,
                reading: tracker.last,
                elapsed_ms,
            });
        } else {
            sink.record(Notice::StillWaiting {
                bin: tracker.bin,
                reading: tracker.last,
                elapsed_ms,
            });
        }
    }

    /// Rapid single readings; true at the first valid echo
    fn probe<S: RangeSensor>(&self, sensor: &mut S) -> bool {
        (0..self.policy.probe_attempts.max(1))
            .any(|_| sensor.measure_once(self.policy.probe_timeout_us).is_valid())
    }

    /// Sleep `ms` in slices, returning true if a stop was requested
    fn pause<I: Interrupt>(&self, ms: u32, interrupt: &mut I) -> bool {
        let slice_ms = self.policy.poll_slice_ms.max(1);
        let mut remaining = ms;
        loop {
            if interrupt.is_requested() {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            let slice = remaining.min(slice_ms);
            self.clock.delay_ms(slice);
            remaining -= slice;
        }
    }

    /// Time to the next recheck, cut short by the bin's deadline
    fn next_pause_ms(&self, tracker: &Tracker) -> u32 {
        let remaining = self
            .policy
            .timeout_ms
            .saturating_sub(self.elapsed_ms(tracker));
        self.policy.recheck_interval_ms.min(remaining)
    }

    fn elapsed_ms(&self, tracker: &Tracker) -> u32 {
        let ms = self.clock.elapsed_us(tracker.started_us) / 1_000;
        ms.min(u32::MAX as u64) as u32
    }

    fn outcome(&self, tracker: &Tracker, status: ClearanceStatus) -> ClearanceOutcome {
        ClearanceOutcome {
            bin: tracker.bin,
            status,
            elapsed_ms: self.elapsed_ms(tracker),
            last_reading: tracker.last,
        }
    }

    /// Whether the cycle goes on after a bin ended with `status`
    fn may_continue(&self, status: ClearanceStatus) -> bool {
        match status {
            ClearanceStatus::Cleared => true,
            ClearanceStatus::TimedOut => self.policy.on_timeout == TimeoutPolicy::Proceed,
            ClearanceStatus::Disconnected | ClearanceStatus::Interrupted => false,
        }
    }

    /// Reduce outcomes to the cycle verdict; the most severe status wins
    fn conclude(&self, outcomes: Vec<ClearanceOutcome, MAX_SENSORS>) -> ClearanceReport {
        let exit_code = outcomes
            .iter()
            .map(|o| o.status.exit_code())
            .max_by_key(|code| code.code())
            .unwrap_or(ExitCode::AllClear);

        let capture_allowed = match exit_code {
            ExitCode::AllClear => true,
            ExitCode::Timeout => self.policy.on_timeout == TimeoutPolicy::Proceed,
            _ => false,
        };

        ClearanceReport {
            outcomes,
            exit_code,
            capture_allowed,
        }
    }
}
