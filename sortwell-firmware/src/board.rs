//! Board assembly
//!
//! Builds every station part from the configuration, taking each pin from
//! the bank exactly once.

use embassy_rp::gpio::Level;
use embassy_rp::peripherals::{PIN_0, PIN_1, UART0};
use embassy_rp::Peri;
use sortwell_core::config::{ConfigError, PinConfig, StationConfig};
use sortwell_core::sensing::SensorArray;
use sortwell_core::station::StationParts;
use sortwell_drivers::companion::CompanionLink;
use sortwell_drivers::indicator::{DigitalChannel, RgbIndicator};
use sortwell_drivers::input::{StopButton, TriggerButton};
use sortwell_drivers::sensor::Hcsr04;
use sortwell_hal::uart::UartConfig;
use sortwell_hal_rp2040::pins::{LINK_RX_PIN, LINK_TX_PIN};
use sortwell_hal_rp2040::{EmbassyClock, PinBank, PinError, RpInput, RpOutput, RpUart};

use crate::journal::Journal;

pub type BinSensor = Hcsr04<RpOutput, RpInput, EmbassyClock>;
pub type LedChannel = DigitalChannel<RpOutput>;
pub type StationLed = RgbIndicator<LedChannel, LedChannel, LedChannel>;
pub type StartButton = TriggerButton<RpInput>;
pub type StopInput = Option<StopButton<RpInput>>;
pub type Companion = CompanionLink<RpUart>;

pub type BoardParts =
    StationParts<BinSensor, StartButton, StopInput, StationLed, Companion, EmbassyClock, Journal>;

/// Hardware bring-up failures; the station does not start
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    Pin(PinError),
    Config(ConfigError),
    /// The companion link only runs on UART0 at GPIO0/GPIO1
    UnsupportedLinkPins { tx: u8, rx: u8 },
}

impl From<PinError> for InitError {
    fn from(e: PinError) -> Self {
        InitError::Pin(e)
    }
}

impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self {
        InitError::Config(e)
    }
}

/// Open the companion link UART
pub fn link_uart(
    config: &StationConfig,
    uart0: Peri<'static, UART0>,
    tx: Peri<'static, PIN_0>,
    rx: Peri<'static, PIN_1>,
) -> Result<RpUart, InitError> {
    let pins = (config.link.tx_pin, config.link.rx_pin);
    if pins != (LINK_TX_PIN, LINK_RX_PIN) {
        return Err(InitError::UnsupportedLinkPins {
            tx: pins.0,
            rx: pins.1,
        });
    }
    Ok(RpUart::new(
        uart0,
        tx,
        rx,
        &UartConfig::with_baudrate(config.link.baudrate),
    ))
}

/// Wire up every part the station needs
pub fn assemble(
    config: &'static StationConfig,
    bank: &mut PinBank,
    uart: RpUart,
) -> Result<BoardParts, InitError> {
    let mut sensors = SensorArray::new();
    for sensor in config.sensors.iter() {
        let trigger = bank.output(&sensor.trigger_pin, Level::Low)?;
        let echo = bank.input(&sensor.echo_pin)?;
        sensors.push(
            sensor.clone(),
            Hcsr04::new(trigger, echo, EmbassyClock, sensor),
        )?;
    }

    let led = &config.indicator;
    let indicator = RgbIndicator::new(
        led_channel(bank, &led.red_pin)?,
        led_channel(bank, &led.green_pin)?,
        led_channel(bank, &led.blue_pin)?,
    );

    let samples = config.trigger.debounce_samples();
    let start = &config.trigger.pin;
    let trigger = TriggerButton::new(bank.input(start)?, start.inverted, samples);
    let interrupt = match &config.trigger.stop_pin {
        Some(stop) => Some(StopButton::new(bank.input(stop)?, stop.inverted, samples)),
        None => None,
    };

    Ok(StationParts {
        sensors,
        trigger,
        interrupt,
        indicator,
        companion: CompanionLink::new(uart),
        clock: EmbassyClock,
        sink: Journal::new(config),
    })
}

fn led_channel(bank: &mut PinBank, pin: &PinConfig) -> Result<LedChannel, PinError> {
    // Start dark: the level that means "off" depends on polarity
    let off = if pin.inverted { Level::High } else { Level::Low };
    Ok(DigitalChannel::new(bank.output(pin, off)?, pin.inverted))
}
