//! Distance sensor trait

use crate::sensing::Reading;

/// Trait for single-shot ranging sensors (HC-SR04 and similar)
///
/// Implementations drive one trigger/echo pair. A failed measurement is
/// returned as [`Reading::Invalid`]; there is no error type.
pub trait RangeSensor {
    /// Take one measurement, waiting at most `edge_timeout_us` per echo edge
    fn measure_once(&mut self, edge_timeout_us: u32) -> Reading;

    /// Per-edge timeout sized for this sensor's configured range
    fn edge_timeout_us(&self) -> u32;

    /// Up to `max_attempts` measurements; the first valid one wins
    fn measure_with_retry(&mut self, max_attempts: u8) -> Reading {
        let timeout = self.edge_timeout_us();
        for _ in 0..max_attempts.max(1) {
            let reading = self.measure_once(timeout);
            if reading.is_valid() {
                return reading;
            }
        }
        Reading::Invalid
    }
}
