//! Hardware traits for the sorting station
//!
//! Drivers and the station controller are generic over these traits.
//! `sortwell-hal-rp2040` implements them on the RP2040; the unit tests in
//! the other crates implement them with scripted pins and a stepped clock.
//!
//! | Module      | Traits                                   |
//! |-------------|------------------------------------------|
//! | [`gpio`]    | [`OutputPin`], [`InputPin`]              |
//! | [`time`]    | [`Clock`]                                |
//! | [`uart`]    | [`UartTx`], [`UartRx`]                   |
//! | [`flash`]   | [`FlashStorage`]                         |

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod time;
pub mod uart;

pub use flash::{FlashStorage, StorageKey};
pub use gpio::{InputPin, Level, OutputPin};
pub use time::Clock;
pub use uart::{UartRx, UartTx};
