//! Minimal TOML parser for station configuration
//!
//! Handles only the subset needed for `station.toml`. It does NOT support
//! the full TOML grammar, and it needs no allocator.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - [section] headers
//! - [section.name] and [section name] headers
//! - A root-level `sensors = ["label", "trig", "echo", ...]` triplet list
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Inline tables
//! - Dotted keys outside section headers

use heapless::String as HString;

use super::hardware::PinConfig;
use super::types::{
    ClearanceMode, ConfigError, SensorConfig, StationConfig, TimeoutPolicy, MAX_LABEL_LEN,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Invalid pin string
    InvalidPin,
    /// `sensors` list length is not a multiple of three
    IncompleteTriplet,
}

/// Why a configuration was replaced by the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigFault {
    Parse(ParseError),
    Invalid(ConfigError),
}

impl From<ParseError> for ConfigFault {
    fn from(e: ParseError) -> Self {
        ConfigFault::Parse(e)
    }
}

impl From<ConfigError> for ConfigFault {
    fn from(e: ConfigError) -> Self {
        ConfigFault::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone)]
enum Section {
    Root,
    Sensor(HString<MAX_LABEL_LEN>),
    Clearance,
    Indicator,
    Trigger,
    Link,
}

/// Parse and validate, returning the reason on failure
pub fn parse_validated(input: &str) -> Result<StationConfig, ConfigFault> {
    let config = parse_config(input)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate, substituting [`StationConfig::fallback`] on any fault
pub fn load_or_fallback(input: &str) -> (StationConfig, Option<ConfigFault>) {
    match parse_validated(input) {
        Ok(config) => (config, None),
        Err(fault) => (StationConfig::fallback(), Some(fault)),
    }
}

/// Parse TOML configuration into StationConfig
///
/// No validation beyond value syntax; call [`StationConfig::validate`].
pub fn parse_config(input: &str) -> Result<StationConfig, ParseError> {
    let mut config = StationConfig::new();
    let mut section = Section::Root;
    let mut current_sensor: Option<SensorConfig> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            save_section(&mut config, &mut current_sensor)?;

            section = parse_section_header(&line[1..line.len() - 1])?;
            if let Section::Sensor(name) = &section {
                // The section name doubles as the label unless `label` is set
                current_sensor = Some(SensorConfig {
                    label: name.clone(),
                    ..Default::default()
                });
            }
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&section, key, value, &mut config, &mut current_sensor)?;
        }
    }

    save_section(&mut config, &mut current_sensor)?;

    Ok(config)
}

/// Parse section header like "sensor glass", "sensor.glass" or "clearance"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    let (kind, name) = match header.split_once('.') {
        Some((kind, name)) => (kind.trim(), Some(name.trim())),
        None => {
            let mut parts = header.split_whitespace();
            let kind = parts.next().ok_or(ParseError::InvalidSection)?;
            (kind, parts.next())
        }
    };

    match kind {
        "sensor" => {
            let name = parse_string(name.ok_or(ParseError::InvalidSection)?)?;
            let name = HString::try_from(name).map_err(|_| ParseError::InvalidSection)?;
            Ok(Section::Sensor(name))
        }
        "clearance" => Ok(Section::Clearance),
        "indicator" => Ok(Section::Indicator),
        "trigger" => Ok(Section::Trigger),
        "link" => Ok(Section::Link),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping a trailing comment outside quotes
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = line.split_once('=')?;

    let mut in_quotes = false;
    let end = rest
        .char_indices()
        .find(|&(_, c)| {
            if c == '"' {
                in_quotes = !in_quotes;
            }
            c == '#' && !in_quotes
        })
        .map_or(rest.len(), |(i, _)| i);

    let (key, value) = (key.trim(), rest[..end].trim());
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

/// Strip surrounding quotes; bare words pass through
fn parse_string(value: &str) -> Result<&str, ParseError> {
    Ok(value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value))
}

/// Parse a label into a bounded string
fn parse_label(value: &str) -> Result<HString<MAX_LABEL_LEN>, ParseError> {
    HString::try_from(parse_string(value)?).map_err(|_| ParseError::InvalidValue)
}

/// Integer or float, by target type
fn parse_num<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4" or a bare "17"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value)?.trim();
    let mut inverted = false;
    let mut pull_up = false;

    // Check for modifiers
    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let digits = s.strip_prefix("gpio").unwrap_or(s);
    let pin: u8 = digits.parse().map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

fn parse_mode(value: &str) -> Result<ClearanceMode, ParseError> {
    match parse_string(value)? {
        "sequential" | "Sequential" => Ok(ClearanceMode::Sequential),
        "interleaved" | "Interleaved" => Ok(ClearanceMode::Interleaved),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_timeout_policy(value: &str) -> Result<TimeoutPolicy, ParseError> {
    match parse_string(value)? {
        "abort" | "Abort" => Ok(TimeoutPolicy::Abort),
        "proceed" | "Proceed" => Ok(TimeoutPolicy::Proceed),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a `["label", "trig", "echo", ...]` list into sensors
///
/// Mirrors a `label trig echo [label trig echo ...]` argument vector.
fn parse_triplets(value: &str, config: &mut StationConfig) -> Result<(), ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut items = split_unquoted(inner, ',')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    loop {
        let Some(label) = items.next() else {
            return Ok(());
        };
        let (Some(trigger), Some(echo)) = (items.next(), items.next()) else {
            return Err(ParseError::IncompleteTriplet);
        };

        let sensor = SensorConfig {
            label: parse_label(label)?,
            trigger_pin: parse_pin(trigger)?,
            echo_pin: parse_pin(echo)?,
            ..Default::default()
        };
        config
            .sensors
            .push(sensor)
            .map_err(|_| ParseError::TooManyItems)?;
    }
}

/// Split on `sep` wherever it is not inside a quoted string
fn split_unquoted<'a>(list: &'a str, sep: char) -> impl Iterator<Item = &'a str> {
    let mut rest = Some(list);
    core::iter::from_fn(move || {
        let current = rest?;
        let mut in_quotes = false;
        let split = current.char_indices().find(|&(_, c)| {
            if c == '"' {
                in_quotes = !in_quotes;
            }
            c == sep && !in_quotes
        });
        match split {
            Some((i, _)) => {
                rest = Some(&current[i + sep.len_utf8()..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Apply a key-value pair to the current section
fn apply_value(
    section: &Section,
    key: &str,
    value: &str,
    config: &mut StationConfig,
    current_sensor: &mut Option<SensorConfig>,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {
            if key == "sensors" {
                parse_triplets(value, config)?;
            }
        }
        Section::Sensor(_) => {
            if let Some(ref mut s) = current_sensor {
                match key {
                    "label" => s.label = parse_label(value)?,
                    "trigger_pin" => s.trigger_pin = parse_pin(value)?,
                    "echo_pin" => s.echo_pin = parse_pin(value)?,
                    "max_range_m" => s.max_range_m = parse_num(value)?,
                    "full_cm" => s.full_cm = parse_num(value)?,
                    "clear_cm" => s.clear_cm = parse_num(value)?,
                    "attempts" => s.attempts = parse_num(value)?,
                    "timeout_margin" => s.timeout_margin = parse_num(value)?,
                    _ => {}
                }
            }
        }
        Section::Clearance => {
            let c = &mut config.clearance;
            match key {
                "mode" => c.mode = parse_mode(value)?,
                "recheck_interval_ms" => c.recheck_interval_ms = parse_num(value)?,
                "timeout_ms" => c.timeout_ms = parse_num(value)?,
                "timeout_s" => c.timeout_ms = parse_num::<u32>(value)?.saturating_mul(1000),
                "probe_attempts" => c.probe_attempts = parse_num(value)?,
                "probe_timeout_us" => c.probe_timeout_us = parse_num(value)?,
                "poll_slice_ms" => c.poll_slice_ms = parse_num(value)?,
                "on_timeout" => c.on_timeout = parse_timeout_policy(value)?,
                _ => {}
            }
        }
        Section::Indicator => {
            let i = &mut config.indicator;
            match key {
                "red_pin" => i.red_pin = parse_pin(value)?,
                "green_pin" => i.green_pin = parse_pin(value)?,
                "blue_pin" => i.blue_pin = parse_pin(value)?,
                "display_ms" => i.display_ms = parse_num(value)?,
                "common_anode" => {
                    // Shorthand for inverting all three channels
                    let inverted = parse_bool(value)?;
                    i.red_pin.inverted = inverted;
                    i.green_pin.inverted = inverted;
                    i.blue_pin.inverted = inverted;
                }
                _ => {}
            }
        }
        Section::Trigger => {
            let t = &mut config.trigger;
            match key {
                "pin" => t.pin = parse_pin(value)?,
                "stop_pin" => t.stop_pin = Some(parse_pin(value)?),
                "debounce_ms" => t.debounce_ms = parse_num(value)?,
                "poll_ms" => t.poll_ms = parse_num(value)?,
                _ => {}
            }
        }
        Section::Link => {
            let l = &mut config.link;
            match key {
                "baudrate" => l.baudrate = parse_num(value)?,
                "tx_pin" => l.tx_pin = parse_pin(value)?.pin,
                "rx_pin" => l.rx_pin = parse_pin(value)?.pin,
                _ => {}
            }
        }
    }

    Ok(())
}

/// Save the sensor under construction, if any
fn save_section(
    config: &mut StationConfig,
    current_sensor: &mut Option<SensorConfig>,
) -> Result<(), ParseError> {
    if let Some(s) = current_sensor.take() {
        config
            .sensors
            .push(s)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin("!gpio12").unwrap();
        assert_eq!(pin.pin, 12);
        assert!(pin.inverted);

        let pin = parse_pin("\"^!gpio2\"").unwrap();
        assert_eq!(pin.pin, 2);
        assert!(pin.inverted);
        assert!(pin.pull_up);

        assert_eq!(parse_pin("\"22\"").unwrap().pin, 22);
        assert_eq!(parse_pin("pin11"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_inline_comments() {
        assert_eq!(parse_key_value("full_cm = 12 # lid"), Some(("full_cm", "12")));
        assert_eq!(
            parse_key_value("label = \"Bin #2\" # spare"),
            Some(("label", "\"Bin #2\""))
        );
        assert_eq!(parse_key_value("full_cm = # nothing"), None);
        assert_eq!(parse_key_value("no equals sign"), None);
    }

    #[test]
    fn test_parse_section_header() {
        match parse_section_header("sensor glass").unwrap() {
            Section::Sensor(name) => assert_eq!(name.as_str(), "glass"),
            _ => panic!("Wrong section type"),
        }

        match parse_section_header("sensor.paper").unwrap() {
            Section::Sensor(name) => assert_eq!(name.as_str(), "paper"),
            _ => panic!("Wrong section type"),
        }

        assert!(matches!(
            parse_section_header("clearance").unwrap(),
            Section::Clearance
        ));
        assert!(parse_section_header("sensor").is_err());
        assert!(parse_section_header("stepper spin").is_err());
    }

    #[test]
    fn test_parse_sensor_sections() {
        let config_str = r#"
[sensor.glass]
label = "Glass"
trigger_pin = "gpio17"
echo_pin = "gpio27"

[sensor.trash]
label = "General Trash"
trigger_pin = "gpio22"
echo_pin = "gpio23"
full_cm = 12.5   # shallower bin
attempts = 3
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.sensors.len(), 2);
        assert_eq!(config.sensors[0].label.as_str(), "Glass");
        assert_eq!(config.sensors[0].echo_pin.pin, 27);
        assert_eq!(config.sensors[1].label.as_str(), "General Trash");
        assert_eq!(config.sensors[1].full_cm, 12.5);
        assert_eq!(config.sensors[1].clear_cm, 20.0);
        assert_eq!(config.sensors[1].attempts, 3);
    }

    #[test]
    fn test_section_name_is_default_label() {
        let config = parse_config("[sensor metal]\ntrigger_pin = 8\necho_pin = 9\n").unwrap();
        assert_eq!(config.sensors[0].label.as_str(), "metal");
    }

    #[test]
    fn test_parse_triplets() {
        let config_str = r#"sensors = ["Green bin", "22", "23", "Blue bin", "gpio6", "gpio5"]"#;
        let config = parse_config(config_str).unwrap();

        assert_eq!(config.sensors.len(), 2);
        assert_eq!(config.sensors[0].label.as_str(), "Green bin");
        assert_eq!(config.sensors[0].trigger_pin.pin, 22);
        assert_eq!(config.sensors[1].echo_pin.pin, 5);
        assert_eq!(config.sensors[1].max_range_m, 6.0);
    }

    #[test]
    fn test_comma_inside_quoted_label() {
        let config_str = r#"sensors = ["Paper, Cardboard", "6", "5", "Glass", "17", "27"]"#;
        let config = parse_config(config_str).unwrap();

        assert_eq!(config.sensors.len(), 2);
        assert_eq!(config.sensors[0].label.as_str(), "Paper, Cardboard");
        assert_eq!(config.sensors[0].trigger_pin.pin, 6);
        assert_eq!(config.sensors[1].label.as_str(), "Glass");
    }

    #[test]
    fn test_split_unquoted() {
        let parts: heapless::Vec<&str, 4> = split_unquoted(r#""a,b",c,"d""#, ',').collect();
        assert_eq!(parts.as_slice(), &[r#""a,b""#, "c", r#""d""#]);
    }

    #[test]
    fn test_incomplete_triplet() {
        let result = parse_config(r#"sensors = ["Green bin", "22"]"#);
        assert_eq!(result, Err(ParseError::IncompleteTriplet));
    }

    #[test]
    fn test_parse_policy_sections() {
        let config_str = r#"
sensors = ["bin", "17", "27"]

[clearance]
mode = "interleaved"
timeout_s = 45
recheck_interval_ms = 500
on_timeout = "proceed"

[indicator]
red_pin = "gpio13"
green_pin = "gpio19"
blue_pin = "gpio26"
common_anode = true

[trigger]
pin = "^!gpio2"
stop_pin = "^!gpio3"
debounce_ms = 40

[link]
baudrate = 57600
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.clearance.mode, ClearanceMode::Interleaved);
        assert_eq!(config.clearance.timeout_ms, 45_000);
        assert_eq!(config.clearance.recheck_interval_ms, 500);
        assert_eq!(config.clearance.on_timeout, TimeoutPolicy::Proceed);
        assert!(config.indicator.red_pin.inverted);
        assert!(config.indicator.blue_pin.inverted);
        assert_eq!(config.trigger.stop_pin.map(|p| p.pin), Some(3));
        assert_eq!(config.trigger.debounce_ms, 40);
        assert_eq!(config.link.baudrate, 57600);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_unknown_section_is_error() {
        assert_eq!(
            parse_config("[heater dryer]\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_fallback_on_empty_sensor_list() {
        let (config, fault) = load_or_fallback("[clearance]\ntimeout_ms = 1000\n");
        assert_eq!(fault, Some(ConfigFault::Invalid(ConfigError::NoSensors)));
        assert_eq!(config, StationConfig::fallback());
    }

    #[test]
    fn test_fallback_on_duplicate_pins() {
        let (config, fault) = load_or_fallback(r#"sensors = ["a", "5", "6", "b", "6", "7"]"#);
        assert_eq!(fault, Some(ConfigFault::Invalid(ConfigError::PinConflict(6))));
        assert_eq!(config.sensors.len(), 1);
        assert_eq!(config.sensors[0].label.as_str(), "bin");
    }

    #[test]
    fn test_fallback_on_malformed_value() {
        let (config, fault) = load_or_fallback("[sensor a]\nfull_cm = lots\n");
        assert_eq!(fault, Some(ConfigFault::Parse(ParseError::InvalidValue)));
        assert_eq!(config, StationConfig::fallback());
    }

    #[test]
    fn test_fallback_on_moved_link_pins() {
        let input = r#"
sensors = ["Glass", "17", "27"]

[link]
tx_pin = "gpio4"
rx_pin = "gpio5"
"#;
        let (config, fault) = load_or_fallback(input);
        assert_eq!(
            fault,
            Some(ConfigFault::Invalid(ConfigError::UnsupportedLinkPins { tx: 4, rx: 5 }))
        );
        assert_eq!(config, StationConfig::fallback());
        assert_eq!(parse_validated(input).err(), fault);
    }

    #[test]
    fn test_valid_config_has_no_fault() {
        let (config, fault) = load_or_fallback(r#"sensors = ["Glass", "17", "27"]"#);
        assert!(fault.is_none());
        assert_eq!(config.sensors[0].label.as_str(), "Glass");
    }
}
