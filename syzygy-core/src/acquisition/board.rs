//! Cross-core reading board
//!
//! The sampling core is the only writer of published values; the control
//! core reads them with plain atomic loads and never waits. Each slot is a
//! single 16-bit word, so a reader always sees a whole reading.
//!
//! Enable flags are the one thing the control core writes. Flipping a flag
//! while a sweep is in flight is a benign race: the sweep may miss a
//! newly-enabled channel (it is picked up on the next sweep) or sample a
//! just-disabled one once more.
//!
//! All accesses use `Relaxed` ordering. No reader depends on ordering
//! between slots, only on eventually seeing a recent value.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

use crate::channel::{Channel, CHANNEL_COUNT, NO_READING};

/// Latest reading per channel, shared between cores
pub struct ReadingBoard {
    values: [AtomicU16; CHANNEL_COUNT],
    enabled: [AtomicBool; CHANNEL_COUNT],
    selected: AtomicU8,
    sweeps: AtomicU32,
}

impl ReadingBoard {
    /// Create a board with every channel disabled and reading [`NO_READING`]
    pub const fn new() -> Self {
        Self {
            values: [
                AtomicU16::new(NO_READING),
                AtomicU16::new(NO_READING),
                AtomicU16::new(NO_READING),
                AtomicU16::new(NO_READING),
                AtomicU16::new(NO_READING),
            ],
            enabled: [
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
            ],
            selected: AtomicU8::new(0),
            sweeps: AtomicU32::new(0),
        }
    }

    // ========================================================================
    // Consumer side
    // ========================================================================

    /// Ask the sampling core to include a channel in its sweeps
    pub fn enable(&self, channel: Channel) {
        self.enabled[channel.index()].store(true, Ordering::Relaxed);
    }

    /// Stop sampling a channel; its partial cycle is frozen
    pub fn disable(&self, channel: Channel) {
        self.enabled[channel.index()].store(false, Ordering::Relaxed);
    }

    /// Check if a channel is being sampled
    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.enabled[channel.index()].load(Ordering::Relaxed)
    }

    /// Select the channel [`read_latest`](Self::read_latest) reports
    ///
    /// Sampling runs continuously, so this only records interest.
    pub fn start_conversion(&self, channel: Channel) {
        self.selected.store(channel.input(), Ordering::Relaxed);
    }

    /// Always true: a reading is available whether or not it is fresh
    pub fn has_result(&self) -> bool {
        true
    }

    /// Latest reading of the selected channel
    pub fn read_latest(&self) -> u16 {
        let selected = self.selected.load(Ordering::Relaxed);
        Channel::from_index(selected as usize)
            .map(|channel| self.read(channel))
            .unwrap_or(NO_READING)
    }

    /// Latest reading of a channel
    ///
    /// [`NO_READING`] until the channel completes its first cycle.
    pub fn read(&self, channel: Channel) -> u16 {
        self.values[channel.index()].load(Ordering::Relaxed)
    }

    /// Completed sweeps since boot
    pub fn sweep_count(&self) -> u32 {
        self.sweeps.load(Ordering::Relaxed)
    }

    // ========================================================================
    // Producer side (sampling core only)
    // ========================================================================

    /// Publish a new reading
    pub fn publish(&self, channel: Channel, value: u16) {
        self.values[channel.index()].store(value, Ordering::Relaxed);
    }

    /// Count a finished sweep
    pub fn note_sweep(&self) {
        // Single writer, so load + store needs no read-modify-write
        let sweeps = self.sweeps.load(Ordering::Relaxed);
        self.sweeps.store(sweeps.wrapping_add(1), Ordering::Relaxed);
    }
}

impl Default for ReadingBoard {
    fn default() -> Self {
        Self::new()
    }
}
