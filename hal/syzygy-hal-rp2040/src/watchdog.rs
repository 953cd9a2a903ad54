//! Hardware watchdog

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::{ResetReason, Watchdog};
use embassy_rp::Peri;
use embassy_time::Duration;
use syzygy_hal::{HardwareWatchdog, ResetCause};

/// RP2040 watchdog
///
/// The counter is paused while a debugger halts either core, so stepping
/// through code does not reset the chip.
pub struct Rp2040Watchdog {
    inner: Watchdog,
    cause: ResetCause,
}

impl Rp2040Watchdog {
    pub fn new(peripheral: Peri<'static, WATCHDOG>) -> Self {
        let mut inner = Watchdog::new(peripheral);
        inner.pause_on_debug(true);
        // The reason register is overwritten by the next reset, so latch it now
        let cause = match inner.reset_reason() {
            Some(ResetReason::TimedOut) => ResetCause::Watchdog,
            Some(ResetReason::Forced) => ResetCause::Forced,
            None => ResetCause::PowerOn,
        };
        Self { inner, cause }
    }
}

impl HardwareWatchdog for Rp2040Watchdog {
    fn start(&mut self, timeout_us: u32) {
        self.inner.start(Duration::from_micros(u64::from(timeout_us)));
    }

    fn feed(&mut self) {
        self.inner.feed();
    }

    fn reset_cause(&self) -> ResetCause {
        self.cause
    }
}
