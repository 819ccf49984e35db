//! Indicator channel outputs
//!
//! One channel drives one LED die. A channel is either a plain GPIO (on/off)
//! or a PWM output (intensity). Common-anode LEDs light when the pin is low,
//! so both kinds support inverted polarity.

use embedded_hal::pwm::SetDutyCycle;
use sortwell_hal::{Level, OutputPin};

/// One color channel
pub trait Channel {
    /// Set normalized intensity in [0, 1]
    fn set_intensity(&mut self, intensity: f32);
}

/// On/off channel on a GPIO pin
///
/// Intensities of one half or more turn the channel on.
pub struct DigitalChannel<P> {
    pin: P,
    /// If true, channel ON = pin LOW
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> DigitalChannel<P> {
    /// Create a channel, initially off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut channel = Self {
            pin,
            inverted,
            on: false,
        };
        channel.set_on(false);
        channel
    }

    pub fn set_on(&mut self, on: bool) {
        self.on = on;
        let level = Level::from(on);
        self.pin
            .set_level(if self.inverted { level.inverse() } else { level });
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Channel for DigitalChannel<P> {
    fn set_intensity(&mut self, intensity: f32) {
        self.set_on(intensity >= 0.5);
    }
}

/// Intensity channel on a PWM output
pub struct PwmChannel<P> {
    pwm: P,
    inverted: bool,
}

impl<P: SetDutyCycle> PwmChannel<P> {
    /// Create a channel, initially off
    pub fn new(pwm: P, inverted: bool) -> Self {
        let mut channel = Self { pwm, inverted };
        channel.set_intensity(0.0);
        channel
    }

    /// Duty cycle for an intensity, after polarity
    fn duty_for(&self, intensity: f32) -> u16 {
        let max = self.pwm.max_duty_cycle();
        let intensity = if intensity > 1.0 {
            1.0
        } else if intensity > 0.0 {
            intensity
        } else {
            0.0
        };
        let duty = (intensity * max as f32 + 0.5) as u16;
        let duty = duty.min(max);
        if self.inverted {
            max - duty
        } else {
            duty
        }
    }

    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> Channel for PwmChannel<P> {
    fn set_intensity(&mut self, intensity: f32) {
        let duty = self.duty_for(intensity);
        // Duty is within 0..=max, the only documented failure
        let _ = self.pwm.set_duty_cycle(duty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    struct MockPwm {
        duty: u16,
    }

    impl embedded_hal::pwm::ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1_000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_digital_active_high() {
        let mut channel = DigitalChannel::new(MockPin { high: true }, false);
        assert!(!channel.is_on());
        assert!(!channel.pin.is_set_high());

        channel.set_intensity(1.0);
        assert!(channel.is_on());
        assert!(channel.pin.is_set_high());
    }

    #[test]
    fn test_digital_inverted() {
        // Common anode: off = pin high
        let mut channel = DigitalChannel::new(MockPin { high: false }, true);
        assert!(channel.pin.is_set_high());

        channel.set_intensity(1.0);
        assert!(!channel.pin.is_set_high());

        channel.set_intensity(0.2);
        assert!(!channel.is_on());
        assert!(channel.release().is_set_high());
    }

    #[test]
    fn test_pwm_intensity() {
        let mut channel = PwmChannel::new(MockPwm { duty: 55 }, false);
        assert_eq!(channel.pwm.duty, 0);

        channel.set_intensity(0.5);
        assert_eq!(channel.pwm.duty, 500);

        channel.set_intensity(7.0);
        assert_eq!(channel.pwm.duty, 1_000);
    }

    #[test]
    fn test_pwm_inverted() {
        let mut channel = PwmChannel::new(MockPwm { duty: 0 }, true);
        assert_eq!(channel.pwm.duty, 1_000);

        channel.set_intensity(1.0);
        assert_eq!(channel.pwm.duty, 0);

        channel.set_intensity(0.25);
        assert_eq!(channel.release().duty, 750);
    }
}
