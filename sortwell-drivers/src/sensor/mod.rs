//! Distance sensor drivers

pub mod hcsr04;
pub mod pulse;

pub use hcsr04::Hcsr04;
pub use pulse::{measure_pulse, wait_for_level};
