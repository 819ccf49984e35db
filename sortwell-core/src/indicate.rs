//! Indicator control: show a category color, hold it, turn it off

use sortwell_hal::Clock;

use crate::classify::color_for;
use crate::traits::{Color, Indicator, Interrupt};

/// A color to show and for how long
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorCommand {
    pub color: Color,
    pub duration_ms: u32,
}

/// How a display hold ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldEnd {
    Elapsed,
    Interrupted,
}

/// Owns the indicator and guarantees it ends every display dark
pub struct IndicatorDriver<D> {
    indicator: D,
    display_ms: u32,
    lit: bool,
}

impl<D: Indicator> IndicatorDriver<D> {
    /// Take the indicator, switching it off
    pub fn new(mut indicator: D, display_ms: u32) -> Self {
        indicator.off();
        Self {
            indicator,
            display_ms,
            lit: false,
        }
    }

    /// Command for a category, using the configured display duration
    pub fn command_for(&self, category: &str) -> IndicatorCommand {
        IndicatorCommand {
            color: color_for(category),
            duration_ms: self.display_ms,
        }
    }

    /// Apply a command, hold it, then turn the indicator off
    ///
    /// The hold is slept in `slice_ms` pieces so a stop request cuts it
    /// short. The indicator is off when this returns, either way.
    pub fn show<C: Clock, I: Interrupt>(
        &mut self,
        command: IndicatorCommand,
        clock: &C,
        interrupt: &mut I,
        slice_ms: u32,
    ) -> HoldEnd {
        self.indicator.set_color(command.color);
        self.lit = !command.color.is_off();

        let slice_ms = slice_ms.max(1);
        let mut remaining = command.duration_ms;
        let end = loop {
            if interrupt.is_requested() {
                break HoldEnd::Interrupted;
            }
            if remaining == 0 {
                break HoldEnd::Elapsed;
            }
            let slice = remaining.min(slice_ms);
            clock.delay_ms(slice);
            remaining -= slice;
        };

        self.off();
        end
    }

    pub fn off(&mut self) {
        self.indicator.off();
        self.lit = false;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Release the indicator, dark
    pub fn into_inner(mut self) -> D {
        self.off();
        self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use heapless::Vec;

    #[derive(Default)]
    struct Recorder {
        history: Vec<Color, 8>,
    }

    impl Indicator for Recorder {
        fn set_color(&mut self, color: Color) {
            let _ = self.history.push(color);
        }
    }

    struct SimClock {
        now: Cell<u64>,
    }

    impl Clock for SimClock {
        fn now_us(&self) -> u64 {
            self.now.get()
        }

        fn delay_us(&self, us: u32) {
            self.now.set(self.now.get() + us as u64);
        }
    }

    struct StopAfter(u32);

    impl Interrupt for StopAfter {
        fn is_requested(&mut self) -> bool {
            if self.0 == 0 {
                return true;
            }
            self.0 -= 1;
            false
        }
    }

    #[test]
    fn test_new_turns_off() {
        let driver = IndicatorDriver::new(Recorder::default(), 10_000);
        assert!(!driver.is_lit());
        assert_eq!(driver.into_inner().history.first(), Some(&Color::OFF));
    }

    #[test]
    fn test_show_holds_then_turns_off() {
        let clock = SimClock { now: Cell::new(0) };
        let mut driver = IndicatorDriver::new(Recorder::default(), 10_000);
        let command = driver.command_for("Glass");
        assert_eq!(command.color, Color::PURPLE);

        let end = driver.show(command, &clock, &mut StopAfter(u32::MAX), 50);

        assert_eq!(end, HoldEnd::Elapsed);
        assert_eq!(clock.now_us(), 10_000_000);
        assert!(!driver.is_lit());
        let history = driver.into_inner().history;
        assert_eq!(history[1], Color::PURPLE);
        assert_eq!(history[2], Color::OFF);
    }

    #[test]
    fn test_unknown_category_is_red() {
        let driver = IndicatorDriver::new(Recorder::default(), 10_000);
        assert_eq!(driver.command_for("unknown").color, Color::RED);
    }

    #[test]
    fn test_interrupt_cuts_hold_short() {
        let clock = SimClock { now: Cell::new(0) };
        let mut driver = IndicatorDriver::new(Recorder::default(), 10_000);
        let command = driver.command_for("general trash");

        let end = driver.show(command, &clock, &mut StopAfter(3), 50);

        assert_eq!(end, HoldEnd::Interrupted);
        assert_eq!(clock.now_us(), 150_000);
        assert_eq!(driver.into_inner().history.last(), Some(&Color::OFF));
    }
}
