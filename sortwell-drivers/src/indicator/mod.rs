//! Indicator drivers

pub mod channel;
pub mod rgb;

pub use channel::{Channel, DigitalChannel, PwmChannel};
pub use rgb::RgbIndicator;
