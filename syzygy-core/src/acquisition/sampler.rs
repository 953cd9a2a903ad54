//! Single-channel conversion with bounded waits
//!
//! One conversion is: power the temperature sensor if needed, switch the
//! mux, let the front-end settle, flush stale results, start converting
//! and poll for a result against a fixed budget.
//!
//! A converter that never produces a result yields a raw value of 0
//! instead of an error. The sampling loop also services the watchdog, so
//! it must keep moving; temperature code downstream already treats a zero
//! reading as a fault-looking value.

use embedded_hal::delay::DelayNs;
use syzygy_hal::AdcFifo;

use crate::channel::Channel;
use crate::config::AcquisitionConfig;

/// Result of one conversion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleOutcome {
    /// The FIFO produced a result within the poll budget
    Converted(u16),
    /// The poll budget ran out with the FIFO still empty
    TimedOut,
}

impl SampleOutcome {
    /// Raw value to fold; a timeout reads as 0
    pub fn raw(self) -> u16 {
        match self {
            SampleOutcome::Converted(value) => value,
            SampleOutcome::TimedOut => 0,
        }
    }

    /// Check if the conversion timed out
    pub fn is_timeout(self) -> bool {
        matches!(self, SampleOutcome::TimedOut)
    }
}

/// Drives the ADC one channel at a time
pub struct ChannelSampler<A, D> {
    adc: A,
    delay: D,
    settle_us: u32,
    poll_budget: u32,
    poll_step_us: u32,
}

impl<A: AdcFifo, D: DelayNs> ChannelSampler<A, D> {
    /// Create a sampler that owns the ADC and a busy-wait delay
    pub fn new(adc: A, delay: D, config: &AcquisitionConfig) -> Self {
        Self {
            adc,
            delay,
            settle_us: config.settle_us,
            poll_budget: config.poll_budget,
            poll_step_us: config.poll_step_us,
        }
    }

    /// Convert one channel
    ///
    /// Worst case this returns after `settle_us + poll_budget * poll_step_us`.
    pub fn sample(&mut self, channel: Channel) -> SampleOutcome {
        let temp_sensor = channel.is_temperature_sensor();
        if temp_sensor {
            self.adc.set_temp_sensor_enabled(true);
        }

        self.adc.select_input(channel.input());
        self.delay.delay_us(self.settle_us);
        self.adc.drain();
        self.adc.set_running(true);

        let mut remaining = self.poll_budget;
        while self.adc.is_empty() && remaining > 0 {
            self.delay.delay_us(self.poll_step_us);
            remaining -= 1;
        }

        self.adc.set_running(false);
        let outcome = if self.adc.is_empty() {
            SampleOutcome::TimedOut
        } else {
            SampleOutcome::Converted(self.adc.pop())
        };

        // Sensor off again to limit self-heating
        if temp_sensor {
            self.adc.set_temp_sensor_enabled(false);
        }

        outcome
    }

    /// Busy-wait on the sampler's delay
    pub fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{AdcOp, ManualClock, ScriptedAdc};
    use syzygy_hal::Monotonic;

    fn sampler(adc: &ScriptedAdc, clock: &ManualClock) -> ChannelSampler<ScriptedAdc, crate::testing::ClockDelay> {
        ChannelSampler::new(adc.clone(), clock.delay(), &AcquisitionConfig::default())
    }

    #[test]
    fn test_conversion_sequence() {
        let clock = ManualClock::new();
        let adc = ScriptedAdc::with_values([Some(1234), None, None, None, None]);
        let mut s = sampler(&adc, &clock);

        assert_eq!(s.sample(Channel::Adc0), SampleOutcome::Converted(1234));
        assert_eq!(
            adc.ops(),
            [
                AdcOp::Select(0),
                AdcOp::Drain,
                AdcOp::Run(true),
                AdcOp::Run(false),
                AdcOp::Pop(1234),
            ]
        );
        // Settling delay only; the result was ready on the first poll
        assert_eq!(clock.now_us(), 100);
    }

    #[test]
    fn test_temperature_sensor_power_brackets_read() {
        let clock = ManualClock::new();
        let adc = ScriptedAdc::with_values([None, None, None, None, Some(876)]);
        let mut s = sampler(&adc, &clock);

        assert_eq!(s.sample(Channel::McuTemperature).raw(), 876);
        let ops = adc.ops();
        assert_eq!(ops.first(), Some(&AdcOp::TempSensor(true)));
        assert_eq!(ops.last(), Some(&AdcOp::TempSensor(false)));
        assert_eq!(ops.get(1), Some(&AdcOp::Select(4)));
    }

    #[test]
    fn test_timeout_returns_zero_within_budget() {
        let clock = ManualClock::new();
        let adc = ScriptedAdc::default();
        let mut s = sampler(&adc, &clock);

        let outcome = s.sample(Channel::Adc2);
        assert_eq!(outcome, SampleOutcome::TimedOut);
        assert_eq!(outcome.raw(), 0);
        // 100 µs settle + 10 000 polls at 1 µs
        assert_eq!(clock.now_us(), 10_100);
        assert!(!adc.ops().iter().any(|op| matches!(op, AdcOp::Pop(_))));
        assert_eq!(adc.ops().last(), Some(&AdcOp::Run(false)));
    }

    #[test]
    fn test_slow_conversion_within_budget() {
        let clock = ManualClock::new();
        let adc = ScriptedAdc::with_values([None, Some(2048), None, None, None]);
        adc.state.borrow_mut().latency_polls = 3;
        let mut s = sampler(&adc, &clock);

        assert_eq!(s.sample(Channel::Adc1), SampleOutcome::Converted(2048));
        assert_eq!(clock.now_us(), 103);
    }

    #[test]
    fn test_temperature_sensor_released_after_timeout() {
        let clock = ManualClock::new();
        let adc = ScriptedAdc::default();
        let mut s = sampler(&adc, &clock);

        assert!(s.sample(Channel::McuTemperature).is_timeout());
        assert_eq!(adc.ops().last(), Some(&AdcOp::TempSensor(false)));
    }
}
