//! Build script for syzygy-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    // Re-run if machine.toml changes
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a machine.toml configuration file.        ║\n\
            ║  Please create one in the syzygy-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    // Validate required sections exist
    validate_required_sections(&config);

    // Validate section contents
    validate_acquisition(&config);
    validate_watchdog(&config);
    validate_board(&config);

    println!("cargo:warning=machine.toml validated successfully");
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

/// Keys accepted in each section, mirroring the firmware's parser
const ROOT_KEYS: &[&str] = &["version"];
const ACQUISITION_KEYS: &[&str] = &[
    "oversample",
    "settle_us",
    "poll_budget",
    "poll_step_us",
    "sweep_delay_ms",
    "service_period_ms",
    "startup_grace_ms",
];
const WATCHDOG_KEYS: &[&str] = &["enabled", "timeout_ms", "liveness_window_ms", "heartbeat_led"];
const BOARD_KEYS: &[&str] = &["name", "led_pin", "analog"];

/// Longest timeout the RP2040 watchdog can count
const MAX_WATCHDOG_TIMEOUT_MS: i64 = 8_300;

/// Panic with a boxed list of errors
fn report(title: &str, errors: &[String]) {
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

/// Reject unknown keys in a table
fn check_keys(section: &str, table: &toml::Table, allowed: &[&str], errors: &mut Vec<String>) {
    for key in table.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

/// Read an integer, recording an error if it has the wrong type
fn get_int(section: &str, table: &toml::Table, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match table.get(key) {
        Some(toml::Value::Integer(v)) => Some(*v),
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
        None => None,
    }
}

/// Validate that sections and top-level keys are known
fn validate_required_sections(config: &toml::Value) {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return,
    };

    for (key, value) in root {
        match (key.as_str(), value) {
            ("acquisition" | "watchdog" | "board", toml::Value::Table(_)) => {}
            ("acquisition" | "watchdog" | "board", _) => {
                errors.push(format!("[{}] must be a table", key));
            }
            (key, _) if ROOT_KEYS.contains(&key) => {}
            (key, _) => errors.push(format!("unknown section or key '{}'", key)),
        }
    }

    if let Some(version) = root.get("version") {
        if version.as_integer() != Some(1) {
            errors.push("version must be 1".to_string());
        }
    }

    report("Invalid sections in machine.toml", &errors);
}

/// Validate the [acquisition] section
fn validate_acquisition(config: &toml::Value) {
    let acq = match config.get("acquisition").and_then(|a| a.as_table()) {
        Some(t) => t,
        None => return,
    };

    let mut errors = Vec::new();
    check_keys("acquisition", acq, ACQUISITION_KEYS, &mut errors);

    if let Some(n) = get_int("acquisition", acq, "oversample", &mut errors) {
        if !(1..=255).contains(&n) {
            errors.push("[acquisition] oversample must be 1-255".to_string());
        }
    }
    if let Some(n) = get_int("acquisition", acq, "poll_budget", &mut errors) {
        if n < 1 {
            errors.push("[acquisition] poll_budget must be at least 1".to_string());
        }
    }
    for key in ["settle_us", "poll_step_us", "sweep_delay_ms", "service_period_ms", "startup_grace_ms"] {
        if let Some(n) = get_int("acquisition", acq, key, &mut errors) {
            if n < 0 || n > i64::from(u32::MAX) {
                errors.push(format!("[acquisition] {} out of range", key));
            }
        }
    }

    report("Invalid [acquisition] configuration", &errors);
}

/// Validate the [watchdog] section
fn validate_watchdog(config: &toml::Value) {
    let wdt = match config.get("watchdog").and_then(|w| w.as_table()) {
        Some(t) => t,
        None => return,
    };

    let mut errors = Vec::new();
    check_keys("watchdog", wdt, WATCHDOG_KEYS, &mut errors);

    for key in ["enabled", "heartbeat_led"] {
        if let Some(value) = wdt.get(key) {
            if !value.is_bool() {
                errors.push(format!("[watchdog] {} must be true or false", key));
            }
        }
    }

    let timeout = get_int("watchdog", wdt, "timeout_ms", &mut errors).unwrap_or(4_000);
    let window = get_int("watchdog", wdt, "liveness_window_ms", &mut errors).unwrap_or(2_000);
    let enabled = wdt.get("enabled").and_then(|v| v.as_bool()).unwrap_or(true);

    if enabled {
        if timeout <= 1 || timeout > MAX_WATCHDOG_TIMEOUT_MS {
            errors.push(format!(
                "[watchdog] timeout_ms must be 2-{}",
                MAX_WATCHDOG_TIMEOUT_MS
            ));
        }
        if window >= timeout {
            errors.push("[watchdog] liveness_window_ms must be below timeout_ms".to_string());
        }
        let acquisition_int = |key: &str, default: i64| {
            config
                .get("acquisition")
                .and_then(|a| a.get(key))
                .and_then(|p| p.as_integer())
                .unwrap_or(default)
        };
        let period = acquisition_int("service_period_ms", 100);
        let grace = acquisition_int("startup_grace_ms", 2_000);
        if period >= window {
            errors.push(
                "[acquisition] service_period_ms must be below liveness_window_ms".to_string(),
            );
        }
        // Core 1's first refresh can come up to two service periods after
        // the grace, and must land before the watchdog runs out
        if grace + 2 * period >= timeout {
            errors.push(format!(
                "[acquisition] startup_grace_ms + 2 * service_period_ms must be below timeout_ms ({})",
                timeout
            ));
        }
    }

    report("Invalid [watchdog] configuration", &errors);
}

/// Validate the [board] section
fn validate_board(config: &toml::Value) {
    let board = match config.get("board").and_then(|b| b.as_table()) {
        Some(t) => t,
        None => return,
    };

    let mut errors = Vec::new();
    check_keys("board", board, BOARD_KEYS, &mut errors);

    if let Some(name) = board.get("name") {
        match name.as_str() {
            Some(n) if n.len() > 24 => errors.push("[board] name longer than 24 bytes".to_string()),
            Some(_) => {}
            None => errors.push("[board] name must be a string".to_string()),
        }
    }

    let led_gpio = match board.get("led_pin") {
        Some(pin) => match pin.as_str() {
            Some("none") => None,
            Some(p) if gpio_number(p).is_some_and(|n| n <= 29) => gpio_number(p),
            _ => {
                errors.push("[board] led_pin must be \"gpio0\"-\"gpio29\" or \"none\"".to_string());
                None
            }
        },
        None => Some(25),
    };
    let analog_default = ["gpio26", "gpio27"];
    let analog_gpios: Vec<u8> = match board.get("analog") {
        Some(toml::Value::Array(inputs)) => inputs
            .iter()
            .filter_map(|i| i.as_str())
            .filter_map(gpio_number)
            .collect(),
        _ => analog_default.iter().filter_map(|p| gpio_number(p)).collect(),
    };
    if let Some(led) = led_gpio {
        if analog_gpios.contains(&led) {
            errors.push(format!("[board] led_pin gpio{} is also an analog input", led));
        }
    }

    match board.get("analog") {
        Some(toml::Value::Array(inputs)) => {
            for input in inputs {
                let ok = match input.as_str() {
                    Some("mcu_temp") => true,
                    Some(p) => gpio_number(p).is_some_and(|n| (26..=29).contains(&n)),
                    None => false,
                };
                if !ok {
                    errors.push(format!(
                        "[board] analog input {} is not gpio26-gpio29 or mcu_temp",
                        input
                    ));
                }
            }
        }
        Some(_) => errors.push("[board] analog must be an array".to_string()),
        None => {}
    }

    report("Invalid [board] configuration", &errors);
}

/// Parse "gpioN" into N
fn gpio_number(pin: &str) -> Option<u8> {
    pin.strip_prefix("gpio")?.parse().ok()
}
