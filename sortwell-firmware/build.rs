//! Build script for sortwell-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates station.toml at compile time

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIOs on the RP2040
const GPIO_COUNT: i64 = 30;
/// Companion link UART0 pins
const LINK_TX: i64 = 0;
const LINK_RX: i64 = 1;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("create memory.x in OUT_DIR");
    f.write_all(memory_x).expect("write memory.x");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate station.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=station.toml");

    let config_path = Path::new("station.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: station.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a station.toml configuration file.          ║\n\
            ║  Please create one in the sortwell-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read station.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in station.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut pins = PinLedger::with_link_reserved();
    report("Invalid sensor configuration", validate_sensors(&config, &mut pins));
    report("Invalid clearance configuration", validate_clearance(&config));
    report(
        "Invalid indicator/trigger/link configuration",
        validate_outputs(&config, &mut pins),
    );
    report("Pin assignment conflicts", pins.errors);

    println!("cargo:warning=station.toml validated successfully");
}

/// Panic with a boxed list of errors, if there are any
fn report(title: &str, errors: Vec<String>) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Which role owns each GPIO
#[derive(Default)]
struct PinLedger {
    owners: BTreeMap<i64, String>,
    errors: Vec<String>,
}

impl PinLedger {
    fn with_link_reserved() -> Self {
        let mut ledger = Self::default();
        ledger.owners.insert(LINK_TX, "link tx".into());
        ledger.owners.insert(LINK_RX, "link rx".into());
        ledger
    }

    /// Parse a pin string and claim it for `role`
    fn claim(&mut self, role: &str, value: Option<&toml::Value>) {
        let Some(value) = value else {
            self.errors.push(format!("{} missing", role));
            return;
        };
        let Some(pin) = parse_pin(value) else {
            self.errors.push(format!("{} is not a valid pin", role));
            return;
        };
        if !(0..GPIO_COUNT).contains(&pin) {
            self.errors.push(format!("{}: gpio{} out of range", role, pin));
            return;
        }
        if let Some(owner) = self.owners.get(&pin) {
            self.errors
                .push(format!("{}: gpio{} already used by {}", role, pin, owner));
            return;
        }
        self.owners.insert(pin, role.to_string());
    }
}

/// Accepts "gpio11", "!gpio12", "^gpio4", "^!gpio2" or a bare integer
fn parse_pin(value: &toml::Value) -> Option<i64> {
    match value {
        toml::Value::Integer(n) => Some(*n),
        toml::Value::String(s) => {
            let s = s.trim().trim_start_matches(['!', '^']);
            s.strip_prefix("gpio").unwrap_or(s).parse().ok()
        }
        _ => None,
    }
}

fn as_number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Integer(n) => Some(*n as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Validate the monitored bins
fn validate_sensors(config: &toml::Value, pins: &mut PinLedger) -> Vec<String> {
    let mut errors = Vec::new();
    let mut count = 0;

    // Root-level `sensors = ["label", "trig", "echo", ...]`
    if let Some(list) = config.get("sensors") {
        match list.as_array() {
            Some(items) if items.len() % 3 == 0 => {
                for triplet in items.chunks(3) {
                    let label = triplet[0].as_str().unwrap_or("?");
                    pins.claim(&format!("{} trigger", label), Some(&triplet[1]));
                    pins.claim(&format!("{} echo", label), Some(&triplet[2]));
                    count += 1;
                }
            }
            Some(_) => errors.push("sensors list must be label/trigger/echo triplets".into()),
            None => errors.push("sensors must be an array".into()),
        }
    }

    if let Some(sensors) = config.get("sensor") {
        let Some(sensors) = sensors.as_table() else {
            errors.push("[sensor.*] must be tables".into());
            return errors;
        };
        for (name, sensor) in sensors {
            let Some(sensor) = sensor.as_table() else {
                errors.push(format!("[sensor.{}] must be a table", name));
                continue;
            };
            count += 1;

            pins.claim(&format!("sensor.{} trigger_pin", name), sensor.get("trigger_pin"));
            pins.claim(&format!("sensor.{} echo_pin", name), sensor.get("echo_pin"));

            let full = sensor.get("full_cm").and_then(as_number).unwrap_or(15.0);
            let clear = sensor.get("clear_cm").and_then(as_number).unwrap_or(20.0);
            if full <= 0.0 || full >= clear {
                errors.push(format!(
                    "[sensor.{}] needs 0 < full_cm ({}) < clear_cm ({})",
                    name, full, clear
                ));
            }
            if let Some(range) = sensor.get("max_range_m").and_then(as_number) {
                if range <= 0.0 {
                    errors.push(format!("[sensor.{}] max_range_m must be positive", name));
                }
            }
            if let Some(toml::Value::Integer(attempts)) = sensor.get("attempts") {
                if !(1..=255).contains(attempts) {
                    errors.push(format!("[sensor.{}] attempts must be 1-255", name));
                }
            }
            if let Some(margin) = sensor.get("timeout_margin").and_then(as_number) {
                if margin < 1.0 {
                    errors.push(format!("[sensor.{}] timeout_margin must be >= 1.0", name));
                }
            }
        }
    }

    if count == 0 {
        errors.push("at least one [sensor.*] section is required".into());
    } else if count > 6 {
        errors.push(format!("{} sensors configured, at most 6 supported", count));
    }

    errors
}

/// Validate clearance timing and policy
fn validate_clearance(config: &toml::Value) -> Vec<String> {
    let Some(clearance) = config.get("clearance").and_then(|c| c.as_table()) else {
        return Vec::new();
    };
    let mut errors = Vec::new();

    if let Some(toml::Value::String(mode)) = clearance.get("mode") {
        if !["sequential", "interleaved"].contains(&mode.as_str()) {
            errors.push("[clearance] mode must be 'sequential' or 'interleaved'".into());
        }
    }
    if let Some(toml::Value::String(policy)) = clearance.get("on_timeout") {
        if !["abort", "proceed"].contains(&policy.as_str()) {
            errors.push("[clearance] on_timeout must be 'abort' or 'proceed'".into());
        }
    }
    for key in [
        "recheck_interval_ms",
        "timeout_ms",
        "timeout_s",
        "probe_attempts",
        "probe_timeout_us",
        "poll_slice_ms",
    ] {
        if let Some(value) = clearance.get(key) {
            match value.as_integer() {
                Some(n) if n > 0 => {}
                _ => errors.push(format!("[clearance] {} must be a positive integer", key)),
            }
        }
    }

    errors
}

/// Validate indicator, operator inputs and the companion link
fn validate_outputs(config: &toml::Value, pins: &mut PinLedger) -> Vec<String> {
    let mut errors = Vec::new();

    // Link pins are fixed to UART0 on GPIO0/GPIO1
    let link = config.get("link").and_then(|l| l.as_table());
    let tx = link.and_then(|l| l.get("tx_pin")).and_then(parse_pin);
    let rx = link.and_then(|l| l.get("rx_pin")).and_then(parse_pin);
    if tx.unwrap_or(LINK_TX) != LINK_TX || rx.unwrap_or(LINK_RX) != LINK_RX {
        errors.push("[link] must use tx_pin = gpio0 and rx_pin = gpio1".into());
    }

    let indicator = config.get("indicator").and_then(|i| i.as_table());
    for (key, default) in [("red_pin", 13), ("green_pin", 19), ("blue_pin", 26)] {
        let value = indicator
            .and_then(|i| i.get(key).cloned())
            .unwrap_or(toml::Value::Integer(default));
        pins.claim(&format!("indicator {}", key), Some(&value));
    }

    let trigger = config.get("trigger").and_then(|t| t.as_table());
    let start = trigger
        .and_then(|t| t.get("pin").cloned())
        .unwrap_or(toml::Value::Integer(2));
    pins.claim("trigger pin", Some(&start));
    if let Some(stop) = trigger.and_then(|t| t.get("stop_pin")) {
        pins.claim("trigger stop_pin", Some(stop));
    }
    if let Some(toml::Value::Integer(poll)) = trigger.and_then(|t| t.get("poll_ms")) {
        if *poll <= 0 {
            errors.push("[trigger] poll_ms must be positive".into());
        }
    }

    errors
}
