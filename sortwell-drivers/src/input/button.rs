//! Push-button inputs
//!
//! Both buttons are sampled by the caller at a fixed poll rate, so debounce
//! windows are counted in samples.

use sortwell_core::traits::{Interrupt, Trigger};
use sortwell_hal::InputPin;

/// Debounced start button
///
/// A press is accepted once the input has read active for `samples`
/// consecutive polls. It must then read inactive for as long again before
/// another press can be accepted.
pub struct TriggerButton<P> {
    pin: P,
    /// If true, pressed = pin LOW
    active_low: bool,
    samples: u32,
    counter: u32,
    latched: bool,
}

impl<P: InputPin> TriggerButton<P> {
    pub fn new(pin: P, active_low: bool, samples: u32) -> Self {
        Self {
            pin,
            active_low,
            samples: samples.max(1),
            counter: 0,
            latched: false,
        }
    }

    fn is_active(&self) -> bool {
        self.pin.is_high() != self.active_low
    }

    /// Whether a press is held and has not been released yet
    pub fn is_held(&self) -> bool {
        self.latched
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> Trigger for TriggerButton<P> {
    fn poll_pressed(&mut self) -> bool {
        if self.is_active() {
            if self.latched {
                self.counter = self.samples;
                return false;
            }
            self.counter = self.counter.saturating_add(1);
            if self.counter >= self.samples {
                self.latched = true;
                self.counter = self.samples;
                return true;
            }
        } else if self.latched {
            self.counter = self.counter.saturating_sub(1);
            if self.counter == 0 {
                self.latched = false;
            }
        } else {
            // Bounce before acceptance restarts the window
            self.counter = 0;
        }
        false
    }
}

/// Latching stop input
///
/// Once the input has read active for `samples` consecutive checks, every
/// later check reports a stop.
pub struct StopButton<P> {
    pin: P,
    active_low: bool,
    samples: u32,
    counter: u32,
    latched: bool,
}

impl<P: InputPin> StopButton<P> {
    pub fn new(pin: P, active_low: bool, samples: u32) -> Self {
        Self {
            pin,
            active_low,
            samples: samples.max(1),
            counter: 0,
            latched: false,
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> Interrupt for StopButton<P> {
    fn is_requested(&mut self) -> bool {
        if !self.latched {
            if self.pin.is_high() != self.active_low {
                self.counter = self.counter.saturating_add(1);
                self.latched = self.counter >= self.samples;
            } else {
                self.counter = 0;
            }
        }
        self.latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use proptest::prelude::*;

    struct MockPin<'a> {
        high: &'a Cell<bool>,
    }

    impl InputPin for MockPin<'_> {
        fn is_high(&self) -> bool {
            self.high.get()
        }
    }

    /// Poll `n` times, returning how many presses were accepted
    fn poll_n<T: Trigger>(trigger: &mut T, n: u32) -> u32 {
        (0..n).filter(|_| trigger.poll_pressed()).count() as u32
    }

    #[test]
    fn test_press_needs_stable_window() {
        // Active-low with pull-up: idle high
        let line = Cell::new(true);
        let mut button = TriggerButton::new(MockPin { high: &line }, true, 3);

        assert_eq!(poll_n(&mut button, 5), 0);

        line.set(false);
        assert!(!button.poll_pressed());
        assert!(!button.poll_pressed());
        assert!(button.poll_pressed());
        assert!(button.is_held());
    }

    #[test]
    fn test_bounce_restarts_window() {
        let line = Cell::new(true);
        let mut button = TriggerButton::new(MockPin { high: &line }, true, 3);

        line.set(false);
        assert_eq!(poll_n(&mut button, 2), 0);
        line.set(true);
        assert_eq!(poll_n(&mut button, 1), 0);
        line.set(false);
        assert_eq!(poll_n(&mut button, 2), 0);
        assert_eq!(poll_n(&mut button, 1), 1);
    }

    #[test]
    fn test_hold_fires_once() {
        let line = Cell::new(false);
        let mut button = TriggerButton::new(MockPin { high: &line }, true, 3);

        assert_eq!(poll_n(&mut button, 100), 1);
    }

    #[test]
    fn test_release_required_before_rearm() {
        let line = Cell::new(false);
        let mut button = TriggerButton::new(MockPin { high: &line }, true, 3);
        assert_eq!(poll_n(&mut button, 3), 1);

        // Short release is not enough
        line.set(true);
        assert_eq!(poll_n(&mut button, 1), 0);
        line.set(false);
        assert_eq!(poll_n(&mut button, 10), 0);

        line.set(true);
        assert_eq!(poll_n(&mut button, 3), 0);
        assert!(!button.is_held());
        line.set(false);
        assert_eq!(poll_n(&mut button, 3), 1);
    }

    #[test]
    fn test_active_high_button() {
        let line = Cell::new(false);
        let mut button = TriggerButton::new(MockPin { high: &line }, false, 1);
        assert!(!button.poll_pressed());
        line.set(true);
        assert!(button.poll_pressed());
    }

    #[test]
    fn test_stop_latches() {
        let line = Cell::new(true);
        let mut stop = StopButton::new(MockPin { high: &line }, true, 2);
        assert!(!stop.is_requested());

        line.set(false);
        assert!(!stop.is_requested());
        assert!(stop.is_requested());

        // Released, but the request stands
        line.set(true);
        assert!(stop.is_requested());
    }

    #[test]
    fn test_stop_ignores_glitch() {
        let line = Cell::new(true);
        let mut stop = StopButton::new(MockPin { high: &line }, true, 2);

        line.set(false);
        assert!(!stop.is_requested());
        line.set(true);
        assert!(!stop.is_requested());
        assert!(!stop.is_requested());
    }

    proptest! {
        #[test]
        fn press_only_after_stable_window(
            levels in proptest::collection::vec(any::<bool>(), 0..200),
            samples in 1u32..6,
        ) {
            let line = Cell::new(false);
            let mut button = TriggerButton::new(MockPin { high: &line }, false, samples);

            for (i, &level) in levels.iter().enumerate() {
                line.set(level);
                if button.poll_pressed() {
                    let window = &levels[(i + 1).saturating_sub(samples as usize)..=i];
                    prop_assert!(i + 1 >= samples as usize);
                    prop_assert!(window.iter().all(|&l| l));
                }
            }
        }
    }
}
