//! Configuration type definitions
//!
//! These types represent the machine configuration. Configuration is
//! stored in the settings store as postcard-serialized binary data, or
//! compiled in from `machine.toml`.

use heapless::String;

use crate::channel::{Channel, CHANNEL_COUNT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current binary config layout version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 24;

/// Longest timeout the RP2040 watchdog can count (load register is 24 bits
/// and the counter decrements twice per microsecond tick)
pub const MAX_WATCHDOG_TIMEOUT_MS: u32 = 8_300;

/// Sampling and sweep timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcquisitionConfig {
    /// Raw samples averaged into one published reading
    pub oversample: u8,
    /// Mux settling time before each conversion (µs)
    pub settle_us: u32,
    /// Completion polls before a conversion is abandoned
    pub poll_budget: u32,
    /// Spacing between completion polls (µs)
    pub poll_step_us: u32,
    /// Pause between full sweeps (ms)
    pub sweep_delay_ms: u32,
    /// Minimum time between secondary-core watchdog refreshes (ms)
    pub service_period_ms: u32,
    /// Delay after the first service tick before core 1 starts refreshing (ms)
    pub startup_grace_ms: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            oversample: 16,
            settle_us: 100,
            poll_budget: 10_000,
            poll_step_us: 1,
            sweep_delay_ms: 10,
            service_period_ms: 100,
            startup_grace_ms: 2_000,
        }
    }
}

/// Hardware watchdog settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchdogConfig {
    /// Arm the hardware watchdog at boot
    pub enabled: bool,
    /// Reset deadline after the last kick (ms)
    pub timeout_ms: u32,
    /// Maximum age of the other core's heartbeat that still counts as alive (ms)
    pub liveness_window_ms: u32,
    /// Toggle the status LED on every successful kick
    pub heartbeat_led: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 4_000,
            liveness_window_ms: 2_000,
            heartbeat_led: true,
        }
    }
}

impl WatchdogConfig {
    /// Long-timeout variant (8 s)
    pub fn long() -> Self {
        Self {
            timeout_ms: 8_000,
            ..Self::default()
        }
    }
}

/// Board wiring
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Board name (informational)
    pub name: String<MAX_LABEL_LEN>,
    /// Channels sampled from boot, indexed by mux input
    pub analog: [bool; CHANNEL_COUNT],
    /// Status LED GPIO, if the board has one
    pub led_pin: Option<u8>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let mut name = String::new();
        let _ = name.push_str("Raspberry Pi Pico");
        // TEMP_0 on GPIO26 and TEMP_BED on GPIO27
        let mut analog = [false; CHANNEL_COUNT];
        analog[Channel::Adc0.index()] = true;
        analog[Channel::Adc1.index()] = true;
        Self {
            name,
            analog,
            led_pin: Some(25),
        }
    }
}

impl BoardConfig {
    /// Iterate the channels wired for sampling
    pub fn analog_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL
            .into_iter()
            .filter(move |c| self.analog.get(c.index()).copied().unwrap_or(false))
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Layout version
    pub version: u8,
    /// Sampling timing
    pub acquisition: AcquisitionConfig,
    /// Watchdog timing
    pub watchdog: WatchdogConfig,
    /// Board wiring
    pub board: BoardConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            acquisition: AcquisitionConfig::default(),
            watchdog: WatchdogConfig::default(),
            board: BoardConfig::default(),
        }
    }
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigIssue {
    /// Oversample target must be at least 1
    ZeroOversample,
    /// Conversion poll budget must be at least 1
    ZeroPollBudget,
    /// Watchdog timeout is too small to be meaningful
    TimeoutTooShort,
    /// Watchdog timeout exceeds what the hardware can count
    TimeoutTooLong,
    /// Liveness window must be shorter than the watchdog timeout
    WindowNotShorterThanTimeout,
    /// Refresh period must be shorter than the liveness window
    ServicePeriodTooLong,
    /// Core 1 would stay silent past the watchdog timeout at boot
    GraceTooLong,
    /// LED pin out of range (0-29 valid)
    InvalidLedPin,
    /// LED pin is also an enabled analog input
    LedPinIsAnalog,
}

impl MachineConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for values the firmware cannot honour
    ///
    /// The liveness window is only compared against the timeout when the
    /// watchdog is enabled.
    pub fn validate(&self) -> Result<(), ConfigIssue> {
        let acq = &self.acquisition;
        let wdt = &self.watchdog;

        if acq.oversample == 0 {
            return Err(ConfigIssue::ZeroOversample);
        }
        if acq.poll_budget == 0 {
            return Err(ConfigIssue::ZeroPollBudget);
        }
        if let Some(pin) = self.board.led_pin {
            if pin > 29 {
                return Err(ConfigIssue::InvalidLedPin);
            }
            let sampled = Channel::from_gpio(pin)
                .is_some_and(|c| self.board.analog.get(c.index()).copied().unwrap_or(false));
            if sampled {
                return Err(ConfigIssue::LedPinIsAnalog);
            }
        }

        if wdt.enabled {
            if wdt.timeout_ms <= 1 {
                return Err(ConfigIssue::TimeoutTooShort);
            }
            if wdt.timeout_ms > MAX_WATCHDOG_TIMEOUT_MS {
                return Err(ConfigIssue::TimeoutTooLong);
            }
            if wdt.liveness_window_ms >= wdt.timeout_ms {
                return Err(ConfigIssue::WindowNotShorterThanTimeout);
            }
            if acq.service_period_ms >= wdt.liveness_window_ms {
                return Err(ConfigIssue::ServicePeriodTooLong);
            }
            // First refresh from core 1 lands at most two service periods
            // after the grace starts counting
            let first_refresh_ms = acq
                .startup_grace_ms
                .saturating_add(acq.service_period_ms.saturating_mul(2));
            if first_refresh_ms >= wdt.timeout_ms {
                return Err(ConfigIssue::GraceTooLong);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(MachineConfig::default().validate(), Ok(()));

        let mut long = MachineConfig::default();
        long.watchdog = WatchdogConfig::long();
        assert_eq!(long.validate(), Ok(()));
    }

    #[test]
    fn test_default_board_samples_two_thermistors() {
        let board = BoardConfig::default();
        let mut channels = board.analog_channels();
        assert_eq!(channels.next(), Some(Channel::Adc0));
        assert_eq!(channels.next(), Some(Channel::Adc1));
        assert_eq!(channels.next(), None);
    }

    #[test]
    fn test_zero_oversample_rejected() {
        let mut config = MachineConfig::default();
        config.acquisition.oversample = 0;
        assert_eq!(config.validate(), Err(ConfigIssue::ZeroOversample));
    }

    #[test]
    fn test_window_must_be_shorter_than_timeout() {
        let mut config = MachineConfig::default();
        config.watchdog.liveness_window_ms = config.watchdog.timeout_ms;
        assert_eq!(
            config.validate(),
            Err(ConfigIssue::WindowNotShorterThanTimeout)
        );
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = MachineConfig::default();
        config.watchdog.timeout_ms = 1;
        assert_eq!(config.validate(), Err(ConfigIssue::TimeoutTooShort));

        config.watchdog.timeout_ms = 9_000;
        assert_eq!(config.validate(), Err(ConfigIssue::TimeoutTooLong));
    }

    #[test]
    fn test_disabled_watchdog_skips_timing_checks() {
        let mut config = MachineConfig::default();
        config.watchdog.enabled = false;
        config.watchdog.timeout_ms = 0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_led_pin_any_free_gpio() {
        let mut config = MachineConfig::default();
        for pin in [0, 15, 25, 28, 29] {
            config.board.led_pin = Some(pin);
            assert_eq!(config.validate(), Ok(()));
        }

        config.board.led_pin = Some(30);
        assert_eq!(config.validate(), Err(ConfigIssue::InvalidLedPin));

        // GPIO26 is sampled by the default board
        config.board.led_pin = Some(26);
        assert_eq!(config.validate(), Err(ConfigIssue::LedPinIsAnalog));
    }

    #[test]
    fn test_grace_must_end_before_timeout() {
        let mut config = MachineConfig::default();
        config.acquisition.startup_grace_ms = 6_000;
        assert_eq!(config.validate(), Err(ConfigIssue::GraceTooLong));

        config.acquisition.startup_grace_ms = 3_800;
        assert_eq!(config.validate(), Err(ConfigIssue::GraceTooLong));

        config.acquisition.startup_grace_ms = 3_799;
        assert_eq!(config.validate(), Ok(()));

        // The 8 s timeout leaves room for a longer grace
        config.watchdog = WatchdogConfig::long();
        config.acquisition.startup_grace_ms = 6_000;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_service_period_must_fit_in_window() {
        let mut config = MachineConfig::default();
        config.acquisition.service_period_ms = 2_000;
        assert_eq!(config.validate(), Err(ConfigIssue::ServicePeriodTooLong));
    }
}
