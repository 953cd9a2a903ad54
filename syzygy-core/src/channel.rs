//! Analog channel identifiers
//!
//! RP2040 has a single ADC with 5 mux inputs:
//! - ADC0: GPIO26
//! - ADC1: GPIO27
//! - ADC2: GPIO28
//! - ADC3: GPIO29 (VSYS/3 on the Pico)
//! - ADC4: Internal temperature sensor

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of ADC mux inputs, including the internal temperature sensor
pub const CHANNEL_COUNT: usize = 5;

/// Full-scale value of a 12-bit conversion
pub const ADC_MAX: u16 = 4095;

/// Reading published for a channel that has never completed a cycle
///
/// Full scale, so a thermistor that was never sampled looks like an open
/// circuit to temperature code rather than a plausible zero.
pub const NO_READING: u16 = ADC_MAX;

/// ADC channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Channel {
    /// ADC0 on GPIO26
    Adc0 = 0,
    /// ADC1 on GPIO27
    Adc1 = 1,
    /// ADC2 on GPIO28
    Adc2 = 2,
    /// ADC3 on GPIO29
    Adc3 = 3,
    /// Internal temperature sensor
    McuTemperature = 4,
}

impl Channel {
    /// All channels in sweep order
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Adc0,
        Channel::Adc1,
        Channel::Adc2,
        Channel::Adc3,
        Channel::McuTemperature,
    ];

    /// Mux input index, also the channel's slot in per-channel tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Mux input number as programmed into the ADC
    pub const fn input(self) -> u8 {
        self as u8
    }

    /// Channel for a mux input number
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get the GPIO pin for this ADC channel
    pub fn gpio(self) -> Option<u8> {
        match self {
            Channel::Adc0 => Some(26),
            Channel::Adc1 => Some(27),
            Channel::Adc2 => Some(28),
            Channel::Adc3 => Some(29),
            Channel::McuTemperature => None,
        }
    }

    /// Get ADC channel from GPIO pin
    pub fn from_gpio(gpio: u8) -> Option<Self> {
        match gpio {
            26 => Some(Channel::Adc0),
            27 => Some(Channel::Adc1),
            28 => Some(Channel::Adc2),
            29 => Some(Channel::Adc3),
            _ => None,
        }
    }

    /// Whether reading this channel needs the on-die sensor powered
    pub fn is_temperature_sensor(self) -> bool {
        matches!(self, Channel::McuTemperature)
    }
}
