//! Station task
//!
//! Serves cycles until the stop input is pressed, then releases the
//! hardware with the indicator dark and idles.

use defmt::*;
use embassy_time::Timer;

use sortwell_core::config::StationConfig;
use sortwell_core::station::Station;

use crate::board::BoardParts;

/// Run the station; never returns
pub async fn run_station(config: &'static StationConfig, parts: BoardParts) -> ! {
    info!(
        "Station ready: {} bins, press the trigger to start a cycle",
        config.sensors.len()
    );

    let mut station = Station::new(config, parts);
    let exit_code = station.run();
    info!("Station stopped ({}, exit {})", exit_code, exit_code.code());

    // Indicator is already dark; dropping the parts releases every pin
    drop(station.into_parts());

    loop {
        Timer::after_secs(60).await;
        trace!("Stopped, heartbeat");
    }
}
