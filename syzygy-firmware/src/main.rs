//! Syzygy - dual-core analog acquisition firmware
//!
//! Core 1 samples the RP2040 ADC continuously and publishes oversampled
//! readings. Core 0 runs the embassy executor, consumes the readings, and
//! together with core 1 keeps a mutual-liveness watchdog alive: the
//! hardware watchdog is only kicked while both cores have recently
//! checked in.
//!
//! Named after the alignment of two bodies in orbit, one per core.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_time::Duration;
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use syzygy_core::channel::{Channel, CHANNEL_COUNT};
use syzygy_core::config::MachineConfig;
use syzygy_core::supervision::WatchdogSupervisor;
use syzygy_hal::ResetCause;
use syzygy_hal_rp2040::{settings_sector, EmbassyClock, PinError, Rp2040Adc, Rp2040Watchdog};

use crate::channels::{READINGS, SUPERVISOR};
use crate::config::{load_config, ConfigPersistence};

mod channels;
mod config;
mod core1;
mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

/// Core 1 stack size in bytes
const CORE1_STACK_SIZE: usize = 4096;

static CORE1_STACK: StaticCell<Stack<CORE1_STACK_SIZE>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Syzygy firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Latch the reset reason before anything can overwrite it
    let watchdog = Rp2040Watchdog::new(p.WATCHDOG);

    // Configuration is read before core 1 starts so flash access never
    // competes with sampling
    let config = match settings_sector(p.FLASH) {
        Ok(sector) => {
            let mut persistence = ConfigPersistence::new(sector);
            let (config, source) = load_config(&mut persistence, EMBEDDED_CONFIG);
            info!("Configuration source: {}", source);
            config
        }
        Err(e) => {
            error!("Settings sector unavailable: {:?}", e);
            fallback_config()
        }
    };

    let mut pins = syzygy_hal_rp2040::pin_bank!(p);
    let mut temp_sensor = Some(p.ADC_TEMP_SENSOR);

    // ADC bring-up: enable the block and switch the configured pads to analog
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let mut pads: Vec<AdcChannel<'static>, CHANNEL_COUNT> = Vec::new();
    let mut channels: Vec<Channel, CHANNEL_COUNT> = Vec::new();
    for channel in config.board.analog_channels() {
        let pad = if channel.is_temperature_sensor() {
            temp_sensor
                .take()
                .map(AdcChannel::new_temp_sensor)
                .ok_or(PinError::AlreadyTaken)
        } else {
            pins.take_analog(channel)
        };
        match pad {
            Ok(pad) => {
                let _ = pads.push(pad);
                let _ = channels.push(channel);
                READINGS.enable(channel);
            }
            Err(e) => warn!("{}: pad unavailable ({:?}), not sampled", channel, e),
        }
    }
    let adc = Rp2040Adc::new(adc, pads);
    info!("Enabled {} analog channel(s)", channels.len());

    let led = config.board.led_pin.and_then(|gpio| match pins.take_output(gpio) {
        Ok(pin) => {
            info!("Status LED on GPIO{}", gpio);
            Some(Output::new(pin, Level::Low))
        }
        Err(e) => {
            warn!("Status LED on GPIO{} unavailable ({:?}), LED disabled", gpio, e);
            None
        }
    });

    let supervisor: &'static channels::Supervisor = SUPERVISOR.init(WatchdogSupervisor::new(
        watchdog,
        led,
        EmbassyClock,
        config.watchdog,
    ));
    match supervisor.reset_cause() {
        ResetCause::Watchdog => warn!("Reset cause: watchdog timeout"),
        ResetCause::Forced => info!("Reset cause: forced"),
        ResetCause::PowerOn => info!("Reset cause: power-on"),
    }

    let acquisition = config.acquisition;
    spawn_core1(
        p.CORE1,
        CORE1_STACK.init(Stack::new()),
        move || core1::run(adc, supervisor, acquisition),
    );
    info!("Core 1 started");

    // Arm after core 1 is running; it has the startup grace to settle in
    supervisor.init();
    if supervisor.is_armed() {
        info!(
            "Watchdog armed: timeout={}ms window={}ms",
            config.watchdog.timeout_ms, config.watchdog.liveness_window_ms
        );
    } else {
        warn!("Watchdog disabled by configuration");
    }

    // Core 1's first refresh lands within its grace plus two service periods
    let boot_window = Duration::from_millis(u64::from(
        acquisition
            .startup_grace_ms
            .saturating_add(acquisition.service_period_ms.saturating_mul(2)),
    ));
    spawner.spawn(unwrap!(tasks::supervisor_task(supervisor, boot_window)));
    spawner.spawn(unwrap!(tasks::readings_task(channels)));

    #[cfg(feature = "dev-mode")]
    spawner.spawn(unwrap!(tasks::freeze_test_task()));

    info!("All tasks spawned, entering main loop");
}

/// Configuration when the settings sector cannot be opened
fn fallback_config() -> MachineConfig {
    match syzygy_core::config::parse_config(EMBEDDED_CONFIG) {
        Ok(config) if config.validate().is_ok() => config,
        _ => {
            error!("Embedded configuration rejected, using compiled-in defaults");
            MachineConfig::default()
        }
    }
}
