//! Monotonic clock on the Embassy time driver

use embassy_time::{block_for, Duration, Instant};
use sortwell_hal::Clock;

/// Microsecond clock backed by the RP2040 timer peripheral
///
/// Delays busy-wait. The station runs as a single control flow, and echo
/// timing cannot tolerate an executor switch in the middle of a pulse.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }

    fn delay_us(&self, us: u32) {
        block_for(Duration::from_micros(us as u64));
    }

    fn delay_ms(&self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }
}
