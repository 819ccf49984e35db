//! Pulse timing on a digital input
//!
//! Busy-waits on the pin, comparing readings of the monotonic clock. Nothing
//! here sleeps: the edges being timed are microseconds apart.

use sortwell_hal::{Clock, InputPin, Level};

/// Poll `pin` until it reads `level`
///
/// Returns true as soon as the pin matches (immediately if it already does),
/// false once more than `timeout_us` has passed since the call began.
pub fn wait_for_level<P, C>(pin: &P, level: Level, timeout_us: u32, clock: &C) -> bool
where
    P: InputPin + ?Sized,
    C: Clock + ?Sized,
{
    let start = clock.now_us();
    loop {
        if pin.level() == level {
            return true;
        }
        if clock.elapsed_us(start) > timeout_us as u64 {
            return false;
        }
    }
}

/// Width of the next high pulse on `pin`, in µs
///
/// Each edge gets its own `timeout_us`. None if the pulse never starts or
/// never ends.
pub fn measure_pulse<P, C>(pin: &P, timeout_us: u32, clock: &C) -> Option<u64>
where
    P: InputPin + ?Sized,
    C: Clock + ?Sized,
{
    if !wait_for_level(pin, Level::High, timeout_us, clock) {
        return None;
    }
    let rose_at = clock.now_us();
    if !wait_for_level(pin, Level::Low, timeout_us, clock) {
        return None;
    }
    Some(clock.elapsed_us(rose_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Clock that advances 1 µs per reading, like a tight polling loop
    struct PollClock {
        now: Cell<u64>,
    }

    impl PollClock {
        fn new() -> Self {
            Self { now: Cell::new(0) }
        }
    }

    impl Clock for PollClock {
        fn now_us(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + 1);
            now
        }

        fn delay_us(&self, us: u32) {
            self.now.set(self.now.get() + us as u64);
        }
    }

    /// High during [rise, fall) of the clock it watches
    struct PulsePin<'a> {
        clock: &'a PollClock,
        rise: u64,
        fall: u64,
    }

    impl InputPin for PulsePin<'_> {
        fn is_high(&self) -> bool {
            let now = self.clock.now.get();
            now >= self.rise && now < self.fall
        }
    }

    #[test]
    fn test_wait_returns_immediately_on_match() {
        let clock = PollClock::new();
        let pin = PulsePin { clock: &clock, rise: u64::MAX, fall: u64::MAX };
        assert!(wait_for_level(&pin, Level::Low, 0, &clock));
    }

    #[test]
    fn test_wait_times_out() {
        let clock = PollClock::new();
        let pin = PulsePin { clock: &clock, rise: u64::MAX, fall: u64::MAX };
        assert!(!wait_for_level(&pin, Level::High, 500, &clock));
        // Gave up shortly after the timeout, not before
        assert!(clock.now.get() > 500);
        assert!(clock.now.get() < 520);
    }

    #[test]
    fn test_measure_pulse_width() {
        let clock = PollClock::new();
        let pin = PulsePin { clock: &clock, rise: 300, fall: 2_046 };
        let width = measure_pulse(&pin, 10_000, &clock).unwrap();
        assert!((1_744..=1_750).contains(&width), "width {}", width);
    }

    #[test]
    fn test_measure_pulse_never_ends() {
        let clock = PollClock::new();
        let pin = PulsePin { clock: &clock, rise: 100, fall: u64::MAX };
        assert_eq!(measure_pulse(&pin, 1_000, &clock), None);
    }

    #[test]
    fn test_measure_pulse_never_starts() {
        let clock = PollClock::new();
        let pin = PulsePin { clock: &clock, rise: 50_000, fall: 60_000 };
        assert_eq!(measure_pulse(&pin, 1_000, &clock), None);
    }
}
