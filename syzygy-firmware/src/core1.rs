//! Sampling core entry
//!
//! Core 1 runs no executor. It owns the ADC and spins in the acquisition
//! loop until the chip resets.

use defmt::*;
use embassy_time::Delay;

use syzygy_core::acquisition::{
    AcquisitionLoop, ChannelSampler, ServiceOutcome, StepReport,
};
use syzygy_core::config::AcquisitionConfig;
use syzygy_core::supervision::KickOutcome;
use syzygy_hal_rp2040::Rp2040Adc;

use crate::channels::{Supervisor, FREEZE, READINGS};

/// Run the acquisition loop forever
pub fn run(adc: Rp2040Adc<'static>, supervisor: &'static Supervisor, config: AcquisitionConfig) -> ! {
    info!(
        "Core 1 sampling: oversample={} settle={}us budget={}",
        config.oversample, config.settle_us, config.poll_budget
    );

    let sampler = ChannelSampler::new(adc, Delay, &config);
    let acquisition = AcquisitionLoop::new(sampler, &READINGS, supervisor, &FREEZE, config);

    let mut was_frozen = false;
    acquisition.run(|report| match report {
        StepReport::Frozen => {
            if !was_frozen {
                warn!("Core 1 frozen, heartbeat stopped");
                was_frozen = true;
            }
        }
        StepReport::Swept { sweep, service } => {
            was_frozen = false;
            if sweep.timeouts > 0 {
                warn!("{} ADC conversion(s) timed out, folded as 0", sweep.timeouts);
            }
            trace!("Sweep: {}", sweep);

            match service {
                ServiceOutcome::Refreshed(KickOutcome::PeerStale { age_us }) => {
                    warn!("Core 0 heartbeat stale ({} ms), withholding kick", age_us / 1_000);
                }
                ServiceOutcome::InGrace => trace!("Core 1 in startup grace"),
                _ => {}
            }
        }
    })
}
