//! Configuration loading
//!
//! Flash override first, then the embedded `station.toml`, then the
//! built-in fallback.

pub mod loader;

pub use loader::{load_station_config, ConfigPersistence};
