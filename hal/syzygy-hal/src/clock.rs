//! Time source abstraction

/// Free-running microsecond clock shared by both cores
///
/// The counter is 32 bits wide and wraps roughly every 71.6 minutes.
/// Consumers must compare timestamps with `wrapping_sub`, never with `<`.
pub trait Monotonic {
    /// Current time in microseconds
    fn now_us(&self) -> u32;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}
