//! RP2040-specific HAL for the station firmware
//!
//! This crate provides RP2040 implementations of the shared `sortwell-hal`
//! traits:
//!
//! - Pin bank for config-driven, exclusive pin assignment
//! - GPIO input/output wrappers
//! - Monotonic clock on the Embassy time driver
//! - Blocking UART for the companion link
//! - Config partition reader (implements `sortwell_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod gpio;
pub mod pins;
pub mod time;
pub mod uart;

pub use gpio::{RpInput, RpOutput};
pub use pins::{PinBank, PinError, RemainingPeripherals};
pub use time::EmbassyClock;
pub use uart::RpUart;

// Re-export shared traits from sortwell-hal for convenience
pub use sortwell_hal::{FlashStorage as FlashStorageTrait, StorageKey};
