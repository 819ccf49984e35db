//! GPIO wrappers implementing the `sortwell-hal` pin traits
//!
//! Pins are raw here: active-low wiring is handled by the drivers that own
//! them, from the `inverted` flag in the pin config.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;
use sortwell_hal::{InputPin, OutputPin};

/// Digital input, optionally pulled up
pub struct RpInput {
    pin: Input<'static>,
}

impl RpInput {
    pub fn new(pin: Peri<'static, AnyPin>, pull_up: bool) -> Self {
        let pull = if pull_up { Pull::Up } else { Pull::None };
        Self {
            pin: Input::new(pin, pull),
        }
    }
}

impl InputPin for RpInput {
    #[inline]
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

/// Push-pull digital output
pub struct RpOutput {
    pin: Output<'static>,
}

impl RpOutput {
    pub fn new(pin: Peri<'static, AnyPin>, initial: Level) -> Self {
        Self {
            pin: Output::new(pin, initial),
        }
    }
}

impl OutputPin for RpOutput {
    #[inline]
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    #[inline]
    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
