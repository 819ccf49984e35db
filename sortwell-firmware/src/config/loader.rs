//! Configuration persistence
//!
//! Loads the station configuration from flash storage, falling back to the
//! embedded `station.toml` and finally to [`StationConfig::fallback`].

use core::str;
use defmt::*;

use sortwell_core::config::{load_or_fallback, parse_validated, ConfigFault, StationConfig};
use sortwell_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use sortwell_hal_rp2040::FlashStorageTrait;

/// Maximum serialized config size (binary)
const MAX_CONFIG_SIZE: usize = 2048;

/// Maximum TOML config size
const MAX_TOML_SIZE: usize = 4000;

/// Reasons a stored configuration is not used
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    Flash(FlashError),
    /// Postcard decoding failed
    Deserialize,
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// Parsed, but did not validate
    Rejected(ConfigFault),
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

impl From<ConfigFault> for LoadError {
    fn from(e: ConfigFault) -> Self {
        LoadError::Rejected(e)
    }
}

/// Reads station configuration out of the flash config partition
pub struct ConfigPersistence<'d> {
    storage: Rp2040FlashStorage<'d>,
}

impl<'d> ConfigPersistence<'d> {
    pub fn new(storage: Rp2040FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Load configuration from flash
    ///
    /// Tries the TOML override first, then the binary postcard format.
    pub async fn load(&mut self) -> Result<StationConfig, LoadError> {
        match self.load_toml().await {
            Ok(config) => {
                info!("Loaded configuration from TOML in flash");
                return Ok(config);
            }
            Err(LoadError::Flash(FlashError::NotFound)) => {
                debug!("No TOML config in flash, trying binary format");
            }
            Err(e) => {
                warn!("Stored TOML config unusable: {:?}, trying binary", e);
            }
        }

        self.load_binary().await
    }

    async fn load_toml(&mut self) -> Result<StationConfig, LoadError> {
        let mut buffer = [0u8; MAX_TOML_SIZE];
        let len = self
            .storage
            .read(StorageKey::StationConfigToml, &mut buffer)
            .await?;
        debug!("Read {} bytes of TOML from flash", len);

        let toml_str = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;
        Ok(parse_validated(toml_str)?)
    }

    async fn load_binary(&mut self) -> Result<StationConfig, LoadError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = self
            .storage
            .read(StorageKey::StationConfig, &mut buffer)
            .await?;
        debug!("Read {} bytes of binary config from flash", len);

        let config: StationConfig =
            postcard::from_bytes(&buffer[..len]).map_err(|_| LoadError::Deserialize)?;
        config
            .validate()
            .map_err(|e| LoadError::Rejected(ConfigFault::Invalid(e)))?;
        Ok(config)
    }
}

/// Resolve the configuration the station will run with
pub async fn load_station_config(
    persistence: &mut ConfigPersistence<'_>,
    embedded: &str,
) -> StationConfig {
    let config = match persistence.load().await {
        Ok(config) => config,
        Err(e) => {
            info!("No usable configuration in flash ({:?}), using embedded", e);
            let (config, fault) = load_or_fallback(embedded);
            if let Some(fault) = fault {
                error!("Embedded station.toml rejected: {:?}", fault);
                error!("Using minimal fallback configuration");
            }
            config
        }
    };

    log_config_summary(&config);
    config
}

fn log_config_summary(config: &StationConfig) {
    info!(
        "{} bins, {} mode, timeout {} ms, recheck {} ms",
        config.sensors.len(),
        config.clearance.mode,
        config.clearance.timeout_ms,
        config.clearance.recheck_interval_ms
    );
    for sensor in config.sensors.iter() {
        debug!(
            "  {}: trig gpio{} echo gpio{}, full <= {} cm, clear > {} cm",
            sensor.label.as_str(),
            sensor.trigger_pin.pin,
            sensor.echo_pin.pin,
            sensor.full_cm,
            sensor.clear_cm
        );
    }
}
