//! Oversampling accumulator
//!
//! Averages `target` raw samples into one reading on the same 12-bit scale
//! as a single conversion. Consumers run their own filtering and expect one
//! sample's worth of value, not a sum.

/// Per-channel running sum, owned by the sampling core
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Oversampler {
    sum: u32,
    count: u8,
}

impl Oversampler {
    /// Create an empty accumulator
    pub const fn new() -> Self {
        Self { sum: 0, count: 0 }
    }

    /// Fold one raw sample
    ///
    /// Returns the truncated average once `target` samples have been
    /// folded, and starts the next cycle from zero. A target of 0 is
    /// treated as 1.
    pub fn fold(&mut self, raw: u16, target: u8) -> Option<u16> {
        let target = target.max(1);
        self.sum += u32::from(raw);
        self.count += 1;

        if self.count < target {
            return None;
        }

        let average = self.sum / u32::from(target);
        self.reset();
        // Average of u16 samples always fits in u16
        Some(average as u16)
    }

    /// Drop any partial cycle
    pub fn reset(&mut self) {
        self.sum = 0;
        self.count = 0;
    }

    /// Samples folded into the current cycle
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Running sum of the current cycle
    pub fn sum(&self) -> u32 {
        self.sum
    }
}
