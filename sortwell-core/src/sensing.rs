//! Ultrasonic ranging math and the bin sensor array
//!
//! An HC-SR04 reports distance as the width of its echo pulse. The pulse
//! covers the round trip, so the one-way distance is half of
//! `width × speed of sound`.

use heapless::Vec;

use crate::config::{ConfigError, SensorConfig, MAX_SENSORS};

/// Speed of sound in air at ~20 °C, cm/s
pub const SPEED_OF_SOUND_CM_S: f32 = 34_300.0;

/// Speed of sound used for sizing timeouts, m/s
pub const SPEED_OF_SOUND_M_S: f32 = 343.0;

/// Trigger held low before the pulse, µs
pub const TRIGGER_SETTLE_US: u32 = 200;

/// Trigger pulse width, µs
pub const TRIGGER_PULSE_US: u32 = 10;

/// Beyond this the HC-SR04 is not trustworthy, although a value is still reported
pub const PRACTICAL_RANGE_CM: f32 = 400.0;

/// One measurement result
///
/// `Invalid` covers every way a measurement can fail (no echo, echo never
/// ended). It is an ordinary value, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Distance to the nearest surface in centimetres
    Distance(f32),
    Invalid,
}

impl Reading {
    /// Build a reading from a measured echo width
    pub fn from_echo_us(echo_us: u64) -> Self {
        Reading::Distance(distance_cm_from_echo(echo_us))
    }

    /// The distance, if the reading is valid
    pub fn distance_cm(&self) -> Option<f32> {
        match self {
            Reading::Distance(cm) => Some(*cm),
            Reading::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Reading::Distance(_))
    }

    /// Valid but past the sensor's practical range
    pub fn is_beyond_practical_range(&self) -> bool {
        matches!(self, Reading::Distance(cm) if *cm > PRACTICAL_RANGE_CM)
    }
}

/// Convert an echo pulse width to a one-way distance
pub fn distance_cm_from_echo(echo_us: u64) -> f32 {
    let elapsed_s = echo_us as f32 / 1_000_000.0;
    elapsed_s * SPEED_OF_SOUND_CM_S / 2.0
}

/// Sound round trip to `max_distance_m` and back, in seconds
pub fn round_trip_s(max_distance_m: f32) -> f32 {
    2.0 * max_distance_m / SPEED_OF_SOUND_M_S
}

/// Echo edge timeout in seconds: the round trip stretched by `margin`
pub fn timeout_for_max_distance(max_distance_m: f32, margin: f32) -> f32 {
    round_trip_s(max_distance_m) * margin
}

/// [`timeout_for_max_distance`] in microseconds
pub fn edge_timeout_us(max_distance_m: f32, margin: f32) -> u32 {
    (timeout_for_max_distance(max_distance_m, margin) * 1_000_000.0) as u32
}

/// A monitored bin: its configuration and the sensor that watches it
pub struct Bin<S> {
    pub config: SensorConfig,
    pub sensor: S,
}

/// Ordered, labelled collection of bin sensors
///
/// Order is supervision order. Each sensor is owned here for the station's
/// lifetime and handed back by [`SensorArray::into_sensors`] on shutdown.
pub struct SensorArray<S> {
    bins: Vec<Bin<S>, MAX_SENSORS>,
}

impl<S> Default for SensorArray<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SensorArray<S> {
    pub fn new() -> Self {
        Self { bins: Vec::new() }
    }

    /// Add a bin at the end of the supervision order
    pub fn push(&mut self, config: SensorConfig, sensor: S) -> Result<(), ConfigError> {
        self.bins
            .push(Bin { config, sensor })
            .map_err(|_| ConfigError::TooManySensors)
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Label of the bin at `index`, or "?" if out of range
    pub fn label(&self, index: usize) -> &str {
        self.bins
            .get(index)
            .map(|b| b.config.label.as_str())
            .unwrap_or("?")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bin<S>> {
        self.bins.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bin<S>> {
        self.bins.iter_mut()
    }

    /// Release the sensors (and the pins they own)
    pub fn into_sensors(self) -> impl Iterator<Item = S> {
        self.bins.into_iter().map(|b| b.sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f32, b: f32, tolerance: f32) -> bool {
        a - b <= tolerance && b - a <= tolerance
    }

    #[test]
    fn test_distance_from_echo() {
        // 1746 µs round trip is ~29.94 cm
        let cm = distance_cm_from_echo(1746);
        assert!(close(cm, 29.94, 0.1), "got {}", cm);

        assert_eq!(distance_cm_from_echo(0), 0.0);
    }

    #[test]
    fn test_timeout_for_max_distance() {
        assert!(close(round_trip_s(6.0), 0.034985, 1e-5));
        let t = timeout_for_max_distance(6.0, 1.25);
        assert!(close(t, 0.0437, 1e-4), "got {}", t);
        let us = edge_timeout_us(6.0, 1.25);
        assert!((43_700..=43_760).contains(&us), "got {}", us);
    }

    #[test]
    fn test_reading_helpers() {
        let r = Reading::Distance(25.0);
        assert!(r.is_valid());
        assert_eq!(r.distance_cm(), Some(25.0));
        assert!(!r.is_beyond_practical_range());

        assert!(Reading::Distance(450.0).is_beyond_practical_range());
        assert_eq!(Reading::Invalid.distance_cm(), None);
        assert!(!Reading::Invalid.is_beyond_practical_range());
    }

    #[test]
    fn test_array_order_and_labels() {
        let mut array = SensorArray::new();
        array
            .push(SensorConfig::with_pins("Glass", 17, 27).unwrap(), 'g')
            .unwrap();
        array
            .push(SensorConfig::with_pins("Paper", 6, 5).unwrap(), 'p')
            .unwrap();

        assert_eq!(array.len(), 2);
        assert_eq!(array.label(0), "Glass");
        assert_eq!(array.label(1), "Paper");
        assert_eq!(array.label(9), "?");

        let sensors: heapless::Vec<char, 4> = array.into_sensors().collect();
        assert_eq!(sensors.as_slice(), &['g', 'p']);
    }

    #[test]
    fn test_array_capacity() {
        let mut array = SensorArray::new();
        for i in 0..MAX_SENSORS {
            assert!(array.push(SensorConfig::default(), i).is_ok());
        }
        assert_eq!(
            array.push(SensorConfig::default(), 99),
            Err(ConfigError::TooManySensors)
        );
    }

    proptest! {
        #[test]
        fn distance_is_linear_in_echo_width(echo_us in 0u64..60_000) {
            let cm = distance_cm_from_echo(echo_us);
            let expected = echo_us as f32 * 0.01715;
            prop_assert!(close(cm, expected, expected * 1e-4 + 1e-3));
        }

        #[test]
        fn edge_timeout_covers_max_range_echo(max_m in 0.1f32..8.0) {
            // An echo from exactly max range must fit inside the timeout
            let echo_us = (2.0 * max_m / SPEED_OF_SOUND_M_S * 1_000_000.0) as u32;
            prop_assert!(edge_timeout_us(max_m, 1.25) >= echo_us);
        }
    }
}
