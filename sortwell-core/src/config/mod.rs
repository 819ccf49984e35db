//! Configuration types
//!
//! Station configuration is read from `station.toml` (embedded in the
//! firmware or stored in flash) by the parser in [`parse`]. Anything that
//! fails to parse or validate is replaced by [`StationConfig::fallback`].

pub mod hardware;
pub mod parse;
pub mod types;

pub use hardware::*;
pub use parse::{load_or_fallback, parse_config, parse_validated, ConfigFault, ParseError};
pub use types::*;
