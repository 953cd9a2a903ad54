//! Microsecond clock on the embassy time driver

use embassy_time::Instant;
use syzygy_hal::Monotonic;

/// Free-running clock, truncated to 32 bits
///
/// The time driver counts in 1 µs ticks on the RP2040, so the truncated
/// value wraps every ~71.6 minutes, matching the chip's `TIMERAWL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Monotonic for EmbassyClock {
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }
}
