//! Startup grace and freeze switch for the sampling core

use portable_atomic::{AtomicBool, Ordering};

/// Holds off core 1's watchdog refreshes until boot has settled
///
/// The clock starts at the first check. Once the grace has elapsed it stays
/// elapsed, so a later rollover of the 32-bit microsecond timer cannot
/// re-enter the grace period.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartupGrace {
    grace_us: u32,
    started_at: Option<u32>,
    elapsed: bool,
}

impl StartupGrace {
    pub const fn new(grace_ms: u32) -> Self {
        Self {
            grace_us: grace_ms.saturating_mul(1_000),
            started_at: None,
            elapsed: false,
        }
    }

    /// Check the grace at `now_us`, starting it on the first call
    pub fn is_over(&mut self, now_us: u32) -> bool {
        if self.elapsed {
            return true;
        }
        let start = *self.started_at.get_or_insert(now_us);
        if now_us.wrapping_sub(start) >= self.grace_us {
            self.elapsed = true;
        }
        self.elapsed
    }
}

/// Diagnostic switch that parks the sampling core
///
/// While frozen, core 1 spins without sampling or refreshing, which must
/// end in a watchdog reset. Only the `dev-mode` firmware sets it.
pub struct FreezeSwitch {
    frozen: AtomicBool,
}

impl FreezeSwitch {
    pub const fn new() -> Self {
        Self {
            frozen: AtomicBool::new(false),
        }
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Relaxed);
    }

    pub fn thaw(&self) {
        self.frozen.store(false, Ordering::Relaxed);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Relaxed)
    }
}

impl Default for FreezeSwitch {
    fn default() -> Self {
        Self::new()
    }
}
