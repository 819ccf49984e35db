//! Operator input traits

/// Debounced start trigger
pub trait Trigger {
    /// Sample the input once; true exactly once per accepted press
    ///
    /// Called at the configured poll rate. Debouncing is counted in calls.
    fn poll_pressed(&mut self) -> bool;
}

/// Operator stop request
///
/// Sampled inside every waiting loop. Once it reports true it must keep
/// reporting true.
pub trait Interrupt {
    fn is_requested(&mut self) -> bool;
}

/// Interrupt source for stations without a stop input
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterrupt;

impl Interrupt for NoInterrupt {
    fn is_requested(&mut self) -> bool {
        false
    }
}

impl<I: Interrupt> Interrupt for Option<I> {
    fn is_requested(&mut self) -> bool {
        self.as_mut().map(|i| i.is_requested()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always;

    impl Interrupt for Always {
        fn is_requested(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn test_optional_interrupt() {
        let mut none: Option<Always> = None;
        assert!(!none.is_requested());
        assert!(Some(Always).is_requested());
        assert!(!NoInterrupt.is_requested());
    }
}
