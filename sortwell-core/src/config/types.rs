//! Station configuration types
//!
//! These types define the station-level configuration: monitored bins,
//! clearance policy, indicator wiring, operator inputs and the companion link.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::hardware::{PinClaims, PinConfig, LINK_RX_PIN, LINK_TX_PIN};
use crate::sensing;

/// Maximum label length (bin names)
pub const MAX_LABEL_LEN: usize = 24;

/// Maximum monitored bins
pub const MAX_SENSORS: usize = 6;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No sensor configured
    NoSensors,
    /// More sensors than the array can hold
    TooManySensors,
    /// `full_cm` must be positive and below `clear_cm`
    InvalidThresholds,
    /// Maximum range must be positive
    InvalidRange,
    /// At least one measurement attempt is required
    InvalidAttempts,
    /// Timeout margin must be at least 1.0
    InvalidMargin,
    /// A timing value is zero
    InvalidTiming,
    /// Two bins share a label
    DuplicateLabel,
    /// Pin number outside the chip's GPIO range
    PinOutOfRange(u8),
    /// Pin assigned to more than one role
    PinConflict(u8),
    /// Companion link must be UART0 on GPIO0 (TX) and GPIO1 (RX)
    UnsupportedLinkPins { tx: u8, rx: u8 },
}

/// One monitored bin: an HC-SR04 trigger/echo pair and its thresholds
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// Bin label (e.g., "Glass", "Paper/Cardboard")
    pub label: String<MAX_LABEL_LEN>,
    /// Trigger output pin
    pub trigger_pin: PinConfig,
    /// Echo input pin
    pub echo_pin: PinConfig,
    /// Maximum usable range in metres (sizes the echo timeout)
    pub max_range_m: f32,
    /// At or below this distance the bin is full
    pub full_cm: f32,
    /// Above this distance the bin is clear
    pub clear_cm: f32,
    /// Measurement attempts per reading
    pub attempts: u8,
    /// Factor applied to the round-trip time at max range
    pub timeout_margin: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        let mut label = String::new();
        let _ = label.push_str("bin");
        Self {
            label,
            trigger_pin: PinConfig::new(17),
            echo_pin: PinConfig::new(27),
            max_range_m: 6.0,
            full_cm: 15.0,
            clear_cm: 20.0,
            attempts: 2,
            timeout_margin: 1.25,
        }
    }
}

impl SensorConfig {
    /// Default thresholds with the given label and pins
    pub fn with_pins(label: &str, trigger: u8, echo: u8) -> Option<Self> {
        let label = String::try_from(label).ok()?;
        Some(Self {
            label,
            trigger_pin: PinConfig::new(trigger),
            echo_pin: PinConfig::new(echo),
            ..Default::default()
        })
    }

    /// Per-edge echo timeout in microseconds
    pub fn edge_timeout_us(&self) -> u32 {
        sensing::edge_timeout_us(self.max_range_m, self.timeout_margin)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Negated comparisons also reject NaN
        if !(self.full_cm > 0.0) || !(self.full_cm < self.clear_cm) {
            return Err(ConfigError::InvalidThresholds);
        }
        if !(self.max_range_m > 0.0) {
            return Err(ConfigError::InvalidRange);
        }
        if self.attempts == 0 {
            return Err(ConfigError::InvalidAttempts);
        }
        if !(self.timeout_margin >= 1.0) {
            return Err(ConfigError::InvalidMargin);
        }
        Ok(())
    }
}

/// How several bins are supervised within one clearance cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClearanceMode {
    /// Each bin's wait completes before the next bin starts
    #[default]
    Sequential,
    /// All bins are probed, then polled round-robin
    Interleaved,
}

/// What a bin that never cleared does to the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeoutPolicy {
    /// Skip capture for this cycle
    #[default]
    Abort,
    /// Report the bin and capture anyway
    Proceed,
}

/// Clearance supervision timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClearancePolicy {
    pub mode: ClearanceMode,
    /// Delay between readings while waiting for a bin to be emptied
    pub recheck_interval_ms: u32,
    /// Overall wait per bin before giving up
    pub timeout_ms: u32,
    /// Rapid readings used to detect a disconnected sensor
    pub probe_attempts: u8,
    /// Per-edge echo timeout used by the probe
    pub probe_timeout_us: u32,
    /// Longest uninterrupted sleep; the stop input is sampled at this rate
    pub poll_slice_ms: u32,
    pub on_timeout: TimeoutPolicy,
}

impl Default for ClearancePolicy {
    fn default() -> Self {
        Self {
            mode: ClearanceMode::Sequential,
            recheck_interval_ms: 600,
            timeout_ms: 30_000,
            probe_attempts: 3,
            probe_timeout_us: 30_000,
            poll_slice_ms: 50,
            on_timeout: TimeoutPolicy::Abort,
        }
    }
}

impl ClearancePolicy {
    /// Check timing values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recheck_interval_ms == 0
            || self.timeout_ms == 0
            || self.probe_timeout_us == 0
            || self.poll_slice_ms == 0
        {
            return Err(ConfigError::InvalidTiming);
        }
        if self.probe_attempts == 0 {
            return Err(ConfigError::InvalidAttempts);
        }
        Ok(())
    }
}

/// Tri-color indicator wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndicatorConfig {
    pub red_pin: PinConfig,
    pub green_pin: PinConfig,
    pub blue_pin: PinConfig,
    /// How long a classification color stays lit
    pub display_ms: u32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        // Common-anode LED: a channel is lit when its pin is low
        Self {
            red_pin: PinConfig::inverted(13),
            green_pin: PinConfig::inverted(19),
            blue_pin: PinConfig::inverted(26),
            display_ms: 10_000,
        }
    }
}

/// Operator inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriggerConfig {
    /// Start button
    pub pin: PinConfig,
    /// Optional stop button; shuts the station down when pressed
    pub stop_pin: Option<PinConfig>,
    /// Time a press must be stable before it counts
    pub debounce_ms: u32,
    /// Sampling period while idle
    pub poll_ms: u32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            pin: PinConfig::active_low_pullup(2),
            stop_pin: None,
            debounce_ms: 30,
            poll_ms: 10,
        }
    }
}

impl TriggerConfig {
    /// Consecutive pressed samples needed to accept a press
    pub fn debounce_samples(&self) -> u32 {
        (self.debounce_ms / self.poll_ms.max(1)).max(1)
    }
}

/// Companion link UART settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    pub baudrate: u32,
    pub tx_pin: u8,
    pub rx_pin: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            tx_pin: LINK_TX_PIN,
            rx_pin: LINK_RX_PIN,
        }
    }
}

impl LinkConfig {
    /// The UART is fixed; only the baud rate is free
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.tx_pin, self.rx_pin) != (LINK_TX_PIN, LINK_RX_PIN) {
            return Err(ConfigError::UnsupportedLinkPins {
                tx: self.tx_pin,
                rx: self.rx_pin,
            });
        }
        if self.baudrate == 0 {
            return Err(ConfigError::InvalidTiming);
        }
        Ok(())
    }
}

/// Complete station configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationConfig {
    /// Monitored bins, in supervision order
    pub sensors: Vec<SensorConfig, MAX_SENSORS>,
    pub clearance: ClearancePolicy,
    pub indicator: IndicatorConfig,
    pub trigger: TriggerConfig,
    pub link: LinkConfig,
}

impl StationConfig {
    /// Create a configuration with default settings and no sensors
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-resort configuration: defaults plus a single safe sensor
    pub fn fallback() -> Self {
        let mut config = Self::new();
        let _ = config.sensors.push(SensorConfig::default());
        config
    }

    /// Validate every section and check that no pin is used twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }

        self.link.validate()?;
        let mut claims = PinClaims::new();
        claims.claim(self.link.tx_pin)?;
        claims.claim(self.link.rx_pin)?;

        for (i, sensor) in self.sensors.iter().enumerate() {
            sensor.validate()?;
            if self.sensors[..i].iter().any(|s| s.label == sensor.label) {
                return Err(ConfigError::DuplicateLabel);
            }
            claims.claim(sensor.trigger_pin.pin)?;
            claims.claim(sensor.echo_pin.pin)?;
        }

        self.clearance.validate()?;

        claims.claim(self.indicator.red_pin.pin)?;
        claims.claim(self.indicator.green_pin.pin)?;
        claims.claim(self.indicator.blue_pin.pin)?;

        if self.trigger.poll_ms == 0 {
            return Err(ConfigError::InvalidTiming);
        }
        claims.claim(self.trigger.pin.pin)?;
        if let Some(stop) = self.trigger.stop_pin {
            claims.claim(stop.pin)?;
        }

        Ok(())
    }
}
