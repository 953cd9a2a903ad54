//! Acquisition loop for the sampling core
//!
//! One step is: sweep every enabled channel, refresh the watchdog from
//! core 1 if the service period has passed and the startup grace is over,
//! then pause before the next sweep. [`AcquisitionLoop::run`] repeats that
//! for the rest of the core's life.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::StatefulOutputPin;
use syzygy_hal::{AdcFifo, HardwareWatchdog, Monotonic};

use super::board::ReadingBoard;
use super::oversample::Oversampler;
use super::sampler::ChannelSampler;
use crate::channel::{Channel, CHANNEL_COUNT};
use crate::config::AcquisitionConfig;
use crate::supervision::{CoreId, FreezeSwitch, KickOutcome, StartupGrace, WatchdogSupervisor};

/// Pause between checks of the freeze switch (ms)
const FROZEN_POLL_MS: u32 = 100;

/// Counters for one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepReport {
    /// Channels converted
    pub sampled: u8,
    /// Channels that completed an oversampling cycle
    pub published: u8,
    /// Conversions that ran out of poll budget
    pub timeouts: u8,
}

/// What the watchdog service tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceOutcome {
    /// Service period has not passed yet
    NotDue,
    /// Due, but still inside the startup grace
    InGrace,
    /// Refreshed from core 1
    Refreshed(KickOutcome),
}

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepReport {
    /// Parked by the freeze switch; nothing sampled or refreshed
    Frozen,
    /// Normal iteration
    Swept {
        sweep: SweepReport,
        service: ServiceOutcome,
    },
}

/// The sampling core's main loop
pub struct AcquisitionLoop<'a, A, D, M: RawMutex, W, L, C> {
    sampler: ChannelSampler<A, D>,
    accumulators: [Oversampler; CHANNEL_COUNT],
    was_enabled: [bool; CHANNEL_COUNT],
    board: &'a ReadingBoard,
    supervisor: &'a WatchdogSupervisor<M, W, L, C>,
    freeze: &'a FreezeSwitch,
    grace: StartupGrace,
    last_service_us: u32,
    config: AcquisitionConfig,
}

impl<'a, A, D, M, W, L, C> AcquisitionLoop<'a, A, D, M, W, L, C>
where
    A: AdcFifo,
    D: DelayNs,
    M: RawMutex,
    W: HardwareWatchdog,
    L: StatefulOutputPin,
    C: Monotonic,
{
    pub fn new(
        sampler: ChannelSampler<A, D>,
        board: &'a ReadingBoard,
        supervisor: &'a WatchdogSupervisor<M, W, L, C>,
        freeze: &'a FreezeSwitch,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            sampler,
            accumulators: [Oversampler::new(); CHANNEL_COUNT],
            was_enabled: [false; CHANNEL_COUNT],
            board,
            supervisor,
            freeze,
            grace: StartupGrace::new(config.startup_grace_ms),
            last_service_us: 0,
            config,
        }
    }

    /// Sample every enabled channel once
    ///
    /// A disabled channel keeps its partial cycle untouched. When it is
    /// enabled again the partial cycle is dropped and folding starts over.
    pub fn sweep(&mut self) -> SweepReport {
        let mut report = SweepReport::default();

        for channel in Channel::ALL {
            let i = channel.index();
            if !self.board.is_enabled(channel) {
                self.was_enabled[i] = false;
                continue;
            }
            if !self.was_enabled[i] {
                self.accumulators[i].reset();
                self.was_enabled[i] = true;
            }

            let outcome = self.sampler.sample(channel);
            report.sampled += 1;
            if outcome.is_timeout() {
                report.timeouts += 1;
            }

            if let Some(value) = self.accumulators[i].fold(outcome.raw(), self.config.oversample) {
                self.board.publish(channel, value);
                report.published += 1;
            }
        }

        self.board.note_sweep();
        report
    }

    /// Refresh the watchdog from core 1 when due
    pub fn service(&mut self) -> ServiceOutcome {
        let now = self.supervisor.now_us();
        let period_us = self.config.service_period_ms.saturating_mul(1_000);
        if now.wrapping_sub(self.last_service_us) < period_us {
            return ServiceOutcome::NotDue;
        }
        self.last_service_us = now;

        if !self.grace.is_over(now) {
            return ServiceOutcome::InGrace;
        }
        ServiceOutcome::Refreshed(self.supervisor.refresh(CoreId::Core1))
    }

    /// One loop iteration
    pub fn step(&mut self) -> StepReport {
        if self.freeze.is_frozen() {
            self.sampler.pause_ms(FROZEN_POLL_MS);
            return StepReport::Frozen;
        }

        let sweep = self.sweep();
        let service = self.service();
        self.sampler.pause_ms(self.config.sweep_delay_ms);
        StepReport::Swept { sweep, service }
    }

    /// Run forever, handing each step's report to `on_step`
    pub fn run(mut self, mut on_step: impl FnMut(StepReport)) -> ! {
        loop {
            let report = self.step();
            on_step(report);
        }
    }

    /// Samples folded into `channel`'s current cycle
    pub fn pending(&self, channel: Channel) -> u8 {
        self.accumulators[channel.index()].count()
    }
}
