//! Config-driven pin assignment
//!
//! Every GPIO is moved into a [`PinBank`] at boot and handed out by number,
//! once. Pin numbers come from `station.toml`, so a wiring mistake shows up
//! as a [`PinError`] at start-up instead of two drivers fighting over a line.
//!
//! GPIO0/GPIO1 are the companion link UART and never enter the bank.

use embassy_rp::gpio::{AnyPin, Level};
use embassy_rp::peripherals::{DMA_CH0, FLASH, PIN_0, PIN_1, UART0};
use embassy_rp::{Peri, Peripherals};
use sortwell_core::config::{PinConfig, GPIO_COUNT};

use crate::gpio::{RpInput, RpOutput};

pub use sortwell_core::config::{LINK_RX_PIN, LINK_TX_PIN};

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
    /// Pin reserved for the companion link
    Reserved(u8),
}

/// Holds every free GPIO and hands each one out once
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT as usize],
}

impl PinBank {
    /// Split the chip peripherals into the pin bank and everything else
    pub fn from_peripherals(p: Peripherals) -> (Self, RemainingPeripherals) {
        let bank = Self {
            pins: [
                None,
                None,
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        let remaining = RemainingPeripherals {
            flash: p.FLASH,
            flash_dma: p.DMA_CH0,
            uart0: p.UART0,
            link_tx: p.PIN_0,
            link_rx: p.PIN_1,
        };
        (bank, remaining)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin_num >= GPIO_COUNT {
            return Err(PinError::InvalidPin(pin_num));
        }
        if pin_num == LINK_TX_PIN || pin_num == LINK_RX_PIN {
            return Err(PinError::Reserved(pin_num));
        }
        self.pins[pin_num as usize]
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }

    /// Take a pin and configure it as an input
    pub fn input(&mut self, config: &PinConfig) -> Result<RpInput, PinError> {
        Ok(RpInput::new(self.take(config.pin)?, config.pull_up))
    }

    /// Take a pin and configure it as an output driven to `initial`
    pub fn output(&mut self, config: &PinConfig, initial: Level) -> Result<RpOutput, PinError> {
        Ok(RpOutput::new(self.take(config.pin)?, initial))
    }
}

/// Non-GPIO peripherals (and the link pins) left after creating the bank
pub struct RemainingPeripherals {
    pub flash: Peri<'static, FLASH>,
    pub flash_dma: Peri<'static, DMA_CH0>,
    pub uart0: Peri<'static, UART0>,
    pub link_tx: Peri<'static, PIN_0>,
    pub link_rx: Peri<'static, PIN_1>,
}
