//! Hardware watchdog abstraction

/// Why the chip last came out of reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// Cold boot or external reset
    PowerOn,
    /// The watchdog counter expired
    Watchdog,
    /// Reset forced through the watchdog (debugger or bootloader request)
    Forced,
}

/// Hardware reset timer
///
/// Once started the counter runs until it expires or is fed. There is no
/// way back to a disarmed state at runtime.
pub trait HardwareWatchdog {
    /// Arm the watchdog with the given timeout
    fn start(&mut self, timeout_us: u32);

    /// Reload the counter, pushing the reset deadline out by one timeout
    fn feed(&mut self);

    /// Cause of the most recent reset
    fn reset_cause(&self) -> ResetCause;
}
