//! Sortwell - Waste Sorting Station Firmware
//!
//! Main firmware binary for RP2040-based sorting stations. An operator
//! presses the trigger, the station confirms every bin is empty, then the
//! companion computer captures, classifies and archives the item while the
//! indicator shows its category color.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sortwell_core::config::StationConfig;
use sortwell_hal_rp2040::flash::Rp2040FlashStorage;
use sortwell_hal_rp2040::PinBank;

use crate::config::{load_station_config, ConfigPersistence};

mod board;
mod config;
mod journal;
mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit station.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../station.toml");

// Configuration must live forever for the station's references
static STATION_CONFIG: StaticCell<StationConfig> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Sortwell firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (mut bank, rest) = PinBank::from_peripherals(p);
    info!("Peripherals initialized");

    let storage = Rp2040FlashStorage::new(rest.flash, rest.flash_dma);
    let mut persistence = ConfigPersistence::new(storage);
    let config = load_station_config(&mut persistence, EMBEDDED_CONFIG).await;
    let config: &'static StationConfig = STATION_CONFIG.init(config);

    let parts = match board::link_uart(config, rest.uart0, rest.link_tx, rest.link_rx)
        .and_then(|uart| board::assemble(config, &mut bank, uart))
    {
        Ok(parts) => parts,
        Err(e) => {
            error!("Hardware setup failed: {:?}", e);
            error!("Station not started, fix station.toml and reflash");
            loop {
                cortex_m::asm::wfi();
            }
        }
    };
    info!("Hardware assembled");

    tasks::run_station(config, parts).await
}
