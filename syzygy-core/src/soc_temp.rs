//! On-die temperature sensor conversion
//!
//! The RP2040 sensor reads 0.706 V at 27 °C with a slope of -1.721 mV/°C,
//! against the 3.3 V ADC reference. Everything is done in integer
//! microvolts to stay off the soft-float path.

use crate::channel::NO_READING;

/// Sensor voltage at 27 °C (µV)
const V27_UV: i32 = 706_000;

/// Sensor slope magnitude (µV per °C)
const SLOPE_UV_PER_C: i32 = 1_721;

/// Convert a 12-bit reading of the sensor to tenths of a degree Celsius
///
/// Returns `None` for [`NO_READING`], which means the channel has not
/// completed a cycle yet.
pub fn soc_temperature_x10(raw: u16) -> Option<i16> {
    if raw >= NO_READING {
        return None;
    }

    // raw * 3.3 V / 4096, reduced by 4 to stay inside u32
    let uv = (u32::from(raw) * 825_000 / 1_024) as i32;
    let x10 = 270 - (uv - V27_UV) * 10 / SLOPE_UV_PER_C;
    Some(x10 as i16)
}

/// Tenths of a degree split for printing as `[-]whole.tenths`
///
/// The sign is kept apart from the whole part so values between -0.9 and
/// -0.1 keep their minus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalTenths {
    pub negative: bool,
    pub whole: u16,
    pub tenths: u8,
}

impl DecimalTenths {
    pub fn from_x10(x10: i16) -> Self {
        let magnitude = x10.unsigned_abs();
        Self {
            negative: x10 < 0,
            whole: magnitude / 10,
            tenths: (magnitude % 10) as u8,
        }
    }

    /// `"-"` for negative values, empty otherwise
    pub fn sign(&self) -> &'static str {
        if self.negative {
            "-"
        } else {
            ""
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DecimalTenths {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}{}.{}", self.sign(), self.whole, self.tenths)
    }
}
