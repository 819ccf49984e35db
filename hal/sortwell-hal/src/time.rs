//! Monotonic time source
//!
//! Pulse measurement and polling loops only ever compare two readings of
//! this clock. It must never jump backwards, so a calendar clock is not a
//! valid implementation.

/// Monotonic microsecond clock with busy-wait delays
///
/// Methods take `&self` so one clock can be shared by every sensor and the
/// controller. Implementations backed by a hardware timer are usually
/// zero-sized; simulated clocks use interior mutability.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;

    /// Block for at least `us` microseconds
    fn delay_us(&self, us: u32);

    /// Block for at least `ms` milliseconds
    fn delay_ms(&self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }

    /// Microseconds elapsed since an earlier `now_us()` reading
    fn elapsed_us(&self, since_us: u64) -> u64 {
        self.now_us().saturating_sub(since_us)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    fn delay_us(&self, us: u32) {
        (**self).delay_us(us)
    }

    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
