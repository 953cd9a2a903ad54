//! Consumer of published readings
//!
//! Stands in for the temperature controller: selects each channel, reads
//! the latest value and logs it. Readings never block; a channel that has
//! not completed a cycle reads full scale.

use defmt::*;
use embassy_time::{Duration, Ticker};
use heapless::Vec;

use syzygy_core::channel::{Channel, CHANNEL_COUNT, NO_READING};
use syzygy_core::soc_temp::{soc_temperature_x10, DecimalTenths};

use crate::channels::READINGS;

/// Report interval in milliseconds
pub const REPORT_INTERVAL_MS: u64 = 1_000;

#[embassy_executor::task]
pub async fn readings_task(channels: Vec<Channel, CHANNEL_COUNT>) {
    info!("Readings task started ({} channels)", channels.len());

    let mut ticker = Ticker::every(Duration::from_millis(REPORT_INTERVAL_MS));
    let mut last_sweeps = READINGS.sweep_count();

    loop {
        ticker.next().await;

        for &channel in &channels {
            READINGS.start_conversion(channel);
            if !READINGS.has_result() {
                continue;
            }
            let raw = READINGS.read_latest();

            if raw == NO_READING {
                debug!("{}: no reading", channel);
            } else if channel.is_temperature_sensor() {
                if let Some(t) = soc_temperature_x10(raw) {
                    debug!("{}: raw={} ({}°C)", channel, raw, DecimalTenths::from_x10(t));
                }
            } else {
                debug!("{}: raw={}", channel, raw);
            }
        }

        let sweeps = READINGS.sweep_count();
        if sweeps == last_sweeps {
            warn!("No sweeps from core 1 in the last {} ms", REPORT_INTERVAL_MS);
        }
        last_sweeps = sweeps;
    }
}
