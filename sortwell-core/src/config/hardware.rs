//! Hardware configuration types
//!
//! Pin descriptions and the bookkeeping that keeps every physical pin
//! assigned to exactly one role.

use heapless::FnvIndexSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::ConfigError;

/// Number of GPIO pins on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// Companion link TX; the link only runs on UART0
pub const LINK_TX_PIN: u8 = 0;
/// Companion link RX
pub const LINK_RX_PIN: u8 = 1;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Active-low input with the internal pull-up, e.g. a push button to ground
    pub const fn active_low_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }
}

/// Tracks which GPIO numbers are already assigned
///
/// Configuration validation claims every pin once; a second claim of the
/// same number is a conflict.
pub struct PinClaims {
    claimed: FnvIndexSet<u8, 32>,
}

impl Default for PinClaims {
    fn default() -> Self {
        Self::new()
    }
}

impl PinClaims {
    /// Create an empty claim set
    pub fn new() -> Self {
        Self {
            claimed: FnvIndexSet::new(),
        }
    }

    /// Claim a pin number
    pub fn claim(&mut self, pin: u8) -> Result<(), ConfigError> {
        if pin >= GPIO_COUNT {
            return Err(ConfigError::PinOutOfRange(pin));
        }
        if self.claimed.contains(&pin) {
            return Err(ConfigError::PinConflict(pin));
        }
        self.claimed
            .insert(pin)
            .map_err(|_| ConfigError::PinOutOfRange(pin))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims() {
        let mut claims = PinClaims::new();

        assert!(claims.claim(17).is_ok());
        assert!(claims.claim(27).is_ok());

        // Same pin twice is a conflict
        assert_eq!(claims.claim(17), Err(ConfigError::PinConflict(17)));
    }

    #[test]
    fn test_claim_out_of_range() {
        let mut claims = PinClaims::new();
        assert_eq!(claims.claim(30), Err(ConfigError::PinOutOfRange(30)));
        // A rejected pin is not recorded
        assert!(claims.claim(29).is_ok());
    }

    #[test]
    fn test_pin_constructors() {
        let button = PinConfig::active_low_pullup(2);
        assert!(button.inverted && button.pull_up);
        assert_eq!(PinConfig::inverted(13).pin, 13);
        assert!(!PinConfig::new(4).inverted);
    }
}
