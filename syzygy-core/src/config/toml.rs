//! Simple TOML parser for machine configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! Syzygy configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Single-line arrays of strings: analog = ["gpio26", "mcu_temp"]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Datetime values
//! - Inline tables
//! - Dotted keys

use heapless::String as HString;

use super::types::{MachineConfig, MAX_LABEL_LEN};
use crate::channel::{Channel, CHANNEL_COUNT};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Unknown key for the current section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// String longer than the label capacity
    TooLong,
    /// Invalid pin string
    InvalidPin,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Acquisition,
    Watchdog,
    Board,
}

/// Parse TOML configuration into MachineConfig
///
/// Keys that are absent keep their default value, so an empty document
/// yields [`MachineConfig::default`].
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = parse_section_header(header)?;
            continue;
        }

        // Parse key = value
        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

/// Parse section header like "watchdog"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "acquisition" => Ok(Section::Acquisition),
        "watchdog" => Ok(Section::Watchdog),
        "board" => Ok(Section::Board),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Apply a single key/value to the config
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MachineConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => match key {
            "version" => config.version = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Acquisition => {
            let acq = &mut config.acquisition;
            match key {
                "oversample" => acq.oversample = parse_int(value)?,
                "settle_us" => acq.settle_us = parse_int(value)?,
                "poll_budget" => acq.poll_budget = parse_int(value)?,
                "poll_step_us" => acq.poll_step_us = parse_int(value)?,
                "sweep_delay_ms" => acq.sweep_delay_ms = parse_int(value)?,
                "service_period_ms" => acq.service_period_ms = parse_int(value)?,
                "startup_grace_ms" => acq.startup_grace_ms = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Watchdog => {
            let wdt = &mut config.watchdog;
            match key {
                "enabled" => wdt.enabled = parse_bool(value)?,
                "timeout_ms" => wdt.timeout_ms = parse_int(value)?,
                "liveness_window_ms" => wdt.liveness_window_ms = parse_int(value)?,
                "heartbeat_led" => wdt.heartbeat_led = parse_bool(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Board => {
            let board = &mut config.board;
            match key {
                "name" => board.name = parse_label(value)?,
                "led_pin" => {
                    board.led_pin = match parse_string(value)? {
                        "none" => None,
                        pin => Some(parse_gpio(pin)?),
                    }
                }
                "analog" => board.analog = parse_channel_list(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
    }

    Ok(())
}

/// Split a line into key and value, dropping trailing comments
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    // Remove inline comments
    let value = match value.find('#') {
        // Make sure # is not inside a string
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => Ok(inner),
        // Allow unquoted strings for simple values
        None => Ok(value),
    }
}

/// Parse a string into a fixed-capacity label
fn parse_label(value: &str) -> Result<HString<MAX_LABEL_LEN>, ParseError> {
    let mut label = HString::new();
    label
        .push_str(parse_string(value)?)
        .map_err(|_| ParseError::TooLong)?;
    Ok(label)
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<16> = HString::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio25"
fn parse_gpio(value: &str) -> Result<u8, ParseError> {
    let number = value
        .strip_prefix("gpio")
        .ok_or(ParseError::InvalidPin)?;
    let pin: u8 = number.parse().map_err(|_| ParseError::InvalidPin)?;
    if pin > 29 {
        return Err(ParseError::InvalidPin);
    }
    Ok(pin)
}

/// Parse an analog input name: an ADC-capable GPIO or "mcu_temp"
fn parse_channel(value: &str) -> Result<Channel, ParseError> {
    if value == "mcu_temp" {
        return Ok(Channel::McuTemperature);
    }
    Channel::from_gpio(parse_gpio(value)?).ok_or(ParseError::InvalidPin)
}

/// Parse `["gpio26", "mcu_temp"]` into a per-channel enable table
fn parse_channel_list(value: &str) -> Result<[bool; CHANNEL_COUNT], ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut enabled = [false; CHANNEL_COUNT];
    for item in inner.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let channel = parse_channel(parse_string(item)?)?;
        enabled[channel.index()] = true;
    }
    Ok(enabled)
}
