//! Config-driven GPIO allocation
//!
//! Pin numbers come from `machine.toml`, so pins are handed out by number
//! at runtime. GPIO26-29 are kept as their own types until taken: the ADC
//! needs them typed, while a digital user gets them as `AnyPin` like the
//! rest.

use embassy_rp::adc::Channel;
use embassy_rp::gpio::{AnyPin, Pull};
use embassy_rp::peripherals::{PIN_26, PIN_27, PIN_28, PIN_29};
use embassy_rp::Peri;
use syzygy_core::channel::Channel as AnalogInput;

/// First GPIO with an ADC input
const FIRST_ANALOG_GPIO: u8 = 26;

/// Move every GPIO out of the peripherals into a [`PinBank`]
///
/// ```ignore
/// let mut pins = pin_bank!(p);
/// let led = pins.take_output(25)?;
/// ```
#[macro_export]
macro_rules! pin_bank {
    ($p:expr) => {
        $crate::pins::PinBank::new(
            [
                $p.PIN_0.into(), $p.PIN_1.into(), $p.PIN_2.into(), $p.PIN_3.into(),
                $p.PIN_4.into(), $p.PIN_5.into(), $p.PIN_6.into(), $p.PIN_7.into(),
                $p.PIN_8.into(), $p.PIN_9.into(), $p.PIN_10.into(), $p.PIN_11.into(),
                $p.PIN_12.into(), $p.PIN_13.into(), $p.PIN_14.into(), $p.PIN_15.into(),
                $p.PIN_16.into(), $p.PIN_17.into(), $p.PIN_18.into(), $p.PIN_19.into(),
                $p.PIN_20.into(), $p.PIN_21.into(), $p.PIN_22.into(), $p.PIN_23.into(),
                $p.PIN_24.into(), $p.PIN_25.into(),
            ],
            $p.PIN_26,
            $p.PIN_27,
            $p.PIN_28,
            $p.PIN_29,
        )
    };
}

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Channel has no GPIO pad
    NotAnalog,
}

/// All GPIOs, taken by number
pub struct PinBank {
    digital: [Option<Peri<'static, AnyPin>>; FIRST_ANALOG_GPIO as usize],
    gpio26: Option<Peri<'static, PIN_26>>,
    gpio27: Option<Peri<'static, PIN_27>>,
    gpio28: Option<Peri<'static, PIN_28>>,
    gpio29: Option<Peri<'static, PIN_29>>,
}

impl PinBank {
    /// Create a bank; use [`pin_bank!`] rather than listing the pins by hand
    pub fn new(
        digital: [Peri<'static, AnyPin>; FIRST_ANALOG_GPIO as usize],
        gpio26: Peri<'static, PIN_26>,
        gpio27: Peri<'static, PIN_27>,
        gpio28: Peri<'static, PIN_28>,
        gpio29: Peri<'static, PIN_29>,
    ) -> Self {
        Self {
            digital: digital.map(Some),
            gpio26: Some(gpio26),
            gpio27: Some(gpio27),
            gpio28: Some(gpio28),
            gpio29: Some(gpio29),
        }
    }

    /// Take a pin for digital use
    pub fn take_output(&mut self, gpio: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        let taken = match gpio {
            0..=25 => self.digital[gpio as usize].take(),
            26 => self.gpio26.take().map(Into::into),
            27 => self.gpio27.take().map(Into::into),
            28 => self.gpio28.take().map(Into::into),
            29 => self.gpio29.take().map(Into::into),
            _ => return Err(PinError::InvalidPin),
        };
        taken.ok_or(PinError::AlreadyTaken)
    }

    /// Take an ADC pad and switch it to analog mode
    ///
    /// The internal temperature sensor has no pad; open it from
    /// `ADC_TEMP_SENSOR` instead.
    pub fn take_analog(&mut self, input: AnalogInput) -> Result<Channel<'static>, PinError> {
        let channel = match input {
            AnalogInput::Adc0 => self.gpio26.take().map(|p| Channel::new_pin(p, Pull::None)),
            AnalogInput::Adc1 => self.gpio27.take().map(|p| Channel::new_pin(p, Pull::None)),
            AnalogInput::Adc2 => self.gpio28.take().map(|p| Channel::new_pin(p, Pull::None)),
            AnalogInput::Adc3 => self.gpio29.take().map(|p| Channel::new_pin(p, Pull::None)),
            AnalogInput::McuTemperature => return Err(PinError::NotAnalog),
        };
        channel.ok_or(PinError::AlreadyTaken)
    }
}
