//! Per-core heartbeat timestamps

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Execution context identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreId {
    /// Control core, runs the executor
    Core0,
    /// Sampling core, runs the acquisition loop
    Core1,
}

impl CoreId {
    /// The core this one watches
    pub const fn other(self) -> Self {
        match self {
            CoreId::Core0 => CoreId::Core1,
            CoreId::Core1 => CoreId::Core0,
        }
    }

    const fn index(self) -> usize {
        match self {
            CoreId::Core0 => 0,
            CoreId::Core1 => 1,
        }
    }
}

/// Whether a heartbeat stamped at `peer_beat_us` is still fresh at `now_us`
///
/// Timestamps are wrapping 32-bit microseconds; the age is computed with
/// wrapping subtraction so the comparison survives the ~71 minute rollover.
pub fn peer_alive(now_us: u32, peer_beat_us: u32, window_us: u32) -> bool {
    now_us.wrapping_sub(peer_beat_us) < window_us
}

/// Last heartbeat of each core
///
/// Each slot is written only by its own core and read by the other. A slot
/// that was never stamped reads 0.
pub struct Heartbeats {
    beats: [AtomicU32; 2],
    stamped: [AtomicBool; 2],
}

impl Heartbeats {
    pub const fn new() -> Self {
        Self {
            beats: [AtomicU32::new(0), AtomicU32::new(0)],
            stamped: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    /// Stamp `core`'s heartbeat
    pub fn record(&self, core: CoreId, now_us: u32) {
        self.beats[core.index()].store(now_us, Ordering::Relaxed);
        self.stamped[core.index()].store(true, Ordering::Relaxed);
    }

    /// Whether `core` has stamped at least once
    pub fn is_stamped(&self, core: CoreId) -> bool {
        self.stamped[core.index()].load(Ordering::Relaxed)
    }

    /// Last stamp of `core`
    pub fn last(&self, core: CoreId) -> u32 {
        self.beats[core.index()].load(Ordering::Relaxed)
    }
}

impl Default for Heartbeats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_other_core() {
        assert_eq!(CoreId::Core0.other(), CoreId::Core1);
        assert_eq!(CoreId::Core1.other(), CoreId::Core0);
    }

    #[test]
    fn test_window_boundary() {
        assert!(peer_alive(1_999_999, 0, 2_000_000));
        assert!(!peer_alive(2_000_000, 0, 2_000_000));
    }

    #[test]
    fn test_rollover() {
        let beat = u32::MAX - 500_000;
        assert!(peer_alive(1_000_000, beat, 2_000_000));
        assert!(!peer_alive(1_600_000, beat, 2_000_000));
    }

    #[test]
    fn test_record_is_per_core() {
        let beats = Heartbeats::new();
        assert!(!beats.is_stamped(CoreId::Core1));

        // A stamp of 0 is still a stamp
        beats.record(CoreId::Core1, 0);
        assert!(beats.is_stamped(CoreId::Core1));
        beats.record(CoreId::Core1, 42);
        assert_eq!(beats.last(CoreId::Core1), 42);
        assert_eq!(beats.last(CoreId::Core0), 0);
        assert!(!beats.is_stamped(CoreId::Core0));
    }

    proptest! {
        /// Freshness depends only on the age, not on where in the 32-bit
        /// range the timestamps sit.
        #[test]
        fn freshness_is_age_only(beat in any::<u32>(), age in any::<u32>(), window in 1u32..10_000_000) {
            let now = beat.wrapping_add(age);
            prop_assert_eq!(peer_alive(now, beat, window), age < window);
        }
    }
}
