//! HC-SR04 ultrasonic distance sensor
//!
//! Protocol:
//! 1. Hold TRIG low for 200 µs so the module is idle
//! 2. Pulse TRIG high for 10 µs
//! 3. The module raises ECHO when the burst leaves and drops it when the
//!    reflection returns; the high time is the round trip
//!
//! Both echo edges are bounded by a timeout sized from the configured
//! maximum range.

use sortwell_core::config::SensorConfig;
use sortwell_core::sensing::{Reading, TRIGGER_PULSE_US, TRIGGER_SETTLE_US};
use sortwell_core::traits::RangeSensor;
use sortwell_hal::{Clock, InputPin, OutputPin};

use super::pulse::measure_pulse;

/// One HC-SR04 on a dedicated trigger/echo pin pair
pub struct Hcsr04<T, E, C> {
    trigger: T,
    echo: E,
    clock: C,
    edge_timeout_us: u32,
}

impl<T: OutputPin, E: InputPin, C: Clock> Hcsr04<T, E, C> {
    /// Create a sensor; the trigger is driven low immediately
    pub fn new(mut trigger: T, echo: E, clock: C, config: &SensorConfig) -> Self {
        trigger.set_low();
        Self {
            trigger,
            echo,
            clock,
            edge_timeout_us: config.edge_timeout_us(),
        }
    }

    /// Release the pins
    pub fn release(self) -> (T, E) {
        (self.trigger, self.echo)
    }

    fn fire(&mut self) {
        self.trigger.set_low();
        self.clock.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_high();
        self.clock.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low();
    }
}

impl<T: OutputPin, E: InputPin, C: Clock> RangeSensor for Hcsr04<T, E, C> {
    fn measure_once(&mut self, edge_timeout_us: u32) -> Reading {
        self.fire();
        match measure_pulse(&self.echo, edge_timeout_us, &self.clock) {
            Some(echo_us) => Reading::from_echo_us(echo_us),
            None => Reading::Invalid,
        }
    }

    fn edge_timeout_us(&self) -> u32 {
        self.edge_timeout_us
    }
}
