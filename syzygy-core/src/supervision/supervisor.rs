//! Watchdog supervisor shared by both cores
//!
//! Heartbeats and the armed flag are atomics. The watchdog peripheral and
//! the status LED sit behind a blocking mutex, held only for the duration
//! of a kick.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::StatefulOutputPin;
use portable_atomic::{AtomicBool, Ordering};
use syzygy_hal::{HardwareWatchdog, Monotonic, ResetCause};

use super::heartbeat::{peer_alive, CoreId, Heartbeats};
use crate::config::WatchdogConfig;

/// What a refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KickOutcome {
    /// The peer is alive and the deadline was extended
    Kicked,
    /// The peer has been silent for `age_us`; the watchdog was left to run out
    PeerStale { age_us: u32 },
    /// The watchdog was never armed
    Disarmed,
}

struct Hardware<W, L> {
    watchdog: W,
    led: Option<L>,
}

/// Mutual-liveness watchdog supervisor
pub struct WatchdogSupervisor<M: RawMutex, W, L, C> {
    hardware: Mutex<M, RefCell<Hardware<W, L>>>,
    heartbeats: Heartbeats,
    armed: AtomicBool,
    clock: C,
    config: WatchdogConfig,
}

impl<M, W, L, C> WatchdogSupervisor<M, W, L, C>
where
    M: RawMutex,
    W: HardwareWatchdog,
    L: StatefulOutputPin,
    C: Monotonic,
{
    /// Create a supervisor; nothing is armed until [`init`](Self::init)
    pub fn new(watchdog: W, led: Option<L>, clock: C, config: WatchdogConfig) -> Self {
        Self {
            hardware: Mutex::new(RefCell::new(Hardware { watchdog, led })),
            heartbeats: Heartbeats::new(),
            armed: AtomicBool::new(false),
            clock,
            config,
        }
    }

    /// Stamp core 0's heartbeat and arm the hardware watchdog
    ///
    /// Arming is skipped when the watchdog is disabled in the config; every
    /// later refresh then reports [`KickOutcome::Disarmed`].
    pub fn init(&self) {
        let now = self.clock.now_us();
        self.heartbeats.record(CoreId::Core0, now);

        if !self.config.enabled {
            return;
        }

        let timeout_us = self.config.timeout_ms.saturating_mul(1_000);
        self.hardware.lock(|hw| hw.borrow_mut().watchdog.start(timeout_us));
        self.armed.store(true, Ordering::Relaxed);
    }

    /// Stamp `core`'s heartbeat and kick the watchdog if the other core is alive
    pub fn refresh(&self, core: CoreId) -> KickOutcome {
        let now = self.clock.now_us();
        self.heartbeats.record(core, now);

        if !self.is_armed() {
            return KickOutcome::Disarmed;
        }

        let peer = self.heartbeats.last(core.other());
        let window_us = self.config.liveness_window_ms.saturating_mul(1_000);
        if !peer_alive(now, peer, window_us) {
            return KickOutcome::PeerStale {
                age_us: now.wrapping_sub(peer),
            };
        }

        let heartbeat_led = self.config.heartbeat_led;
        self.hardware.lock(|hw| {
            let mut hw = hw.borrow_mut();
            hw.watchdog.feed();
            if heartbeat_led {
                if let Some(led) = hw.led.as_mut() {
                    // A failed toggle only costs the visual indicator
                    let _ = led.toggle();
                }
            }
        });
        KickOutcome::Kicked
    }

    /// Why the chip last reset
    pub fn reset_cause(&self) -> ResetCause {
        self.hardware.lock(|hw| hw.borrow().watchdog.reset_cause())
    }

    /// Check if the hardware watchdog is counting
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Relaxed)
    }

    /// Check if `core` has refreshed since boot
    ///
    /// Core 1 stays silent through its startup grace, so a stale core 1
    /// that has never checked in is still booting rather than hung.
    pub fn has_checked_in(&self, core: CoreId) -> bool {
        self.heartbeats.is_stamped(core)
    }

    /// Last heartbeat of `core`
    #[cfg(test)]
    pub(crate) fn heartbeat(&self, core: CoreId) -> u32 {
        self.heartbeats.last(core)
    }

    /// Current time on the supervisor's clock
    pub fn now_us(&self) -> u32 {
        self.clock.now_us()
    }

    /// Watchdog settings in force
    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLed, ManualClock, RecordingWatchdog};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use proptest::prelude::*;

    type TestSupervisor = WatchdogSupervisor<NoopRawMutex, RecordingWatchdog, FakeLed, ManualClock>;

    struct Rig {
        clock: ManualClock,
        watchdog: RecordingWatchdog,
        led: FakeLed,
        supervisor: TestSupervisor,
    }

    fn rig(config: WatchdogConfig) -> Rig {
        let clock = ManualClock::new();
        let watchdog = RecordingWatchdog::new(&clock);
        let led = FakeLed::default();
        let supervisor =
            WatchdogSupervisor::new(watchdog.clone(), Some(led.clone()), clock.clone(), config);
        Rig {
            clock,
            watchdog,
            led,
            supervisor,
        }
    }

    #[test]
    fn test_init_arms_with_timeout() {
        let r = rig(WatchdogConfig::default());
        r.clock.set_us(1_000);
        r.supervisor.init();
        assert!(r.supervisor.is_armed());
        assert_eq!(r.watchdog.log.timeout_us.get(), Some(4_000_000));
        assert_eq!(r.supervisor.heartbeat(CoreId::Core0), 1_000);

        let long = rig(WatchdogConfig::long());
        long.supervisor.init();
        assert_eq!(long.watchdog.log.timeout_us.get(), Some(8_000_000));
    }

    #[test]
    fn test_disabled_watchdog_never_arms() {
        let r = rig(WatchdogConfig {
            enabled: false,
            ..WatchdogConfig::default()
        });
        r.supervisor.init();
        assert!(!r.supervisor.is_armed());
        assert_eq!(r.supervisor.refresh(CoreId::Core0), KickOutcome::Disarmed);
        assert_eq!(r.supervisor.refresh(CoreId::Core1), KickOutcome::Disarmed);
        assert_eq!(r.watchdog.log.timeout_us.get(), None);
        assert_eq!(r.watchdog.log.feeds.get(), 0);
        // Heartbeats are still stamped
        assert_eq!(r.supervisor.heartbeat(CoreId::Core1), 0);
    }

    #[test]
    fn test_kick_requires_fresh_peer() {
        let r = rig(WatchdogConfig::default());
        r.supervisor.init();

        // Core 1 has never beaten; its slot reads 0, still inside the window
        r.clock.advance_ms(100);
        assert_eq!(r.supervisor.refresh(CoreId::Core0), KickOutcome::Kicked);

        r.clock.advance_ms(1_950);
        assert_eq!(
            r.supervisor.refresh(CoreId::Core0),
            KickOutcome::PeerStale { age_us: 2_050_000 }
        );

        // Core 1 sees core 0's fresh beat and kicks
        assert_eq!(r.supervisor.refresh(CoreId::Core1), KickOutcome::Kicked);
        assert_eq!(r.supervisor.refresh(CoreId::Core0), KickOutcome::Kicked);
        assert_eq!(r.watchdog.log.feeds.get(), 3);
    }

    #[test]
    fn test_led_toggles_on_kick_only() {
        let r = rig(WatchdogConfig::default());
        r.supervisor.init();
        r.supervisor.refresh(CoreId::Core1);
        r.supervisor.refresh(CoreId::Core0);
        assert_eq!(r.led.toggles.get(), 2);

        r.clock.advance_ms(3_000);
        r.supervisor.refresh(CoreId::Core0);
        assert_eq!(r.led.toggles.get(), 2);
    }

    #[test]
    fn test_led_disabled() {
        let r = rig(WatchdogConfig {
            heartbeat_led: false,
            ..WatchdogConfig::default()
        });
        r.supervisor.init();
        assert_eq!(r.supervisor.refresh(CoreId::Core1), KickOutcome::Kicked);
        assert_eq!(r.led.toggles.get(), 0);
    }

    #[test]
    fn test_silent_core1_lets_watchdog_fire() {
        let r = rig(WatchdogConfig::default());
        r.supervisor.init();

        // Both cores healthy for a while
        let mut last_kick = 0;
        for _ in 0..20 {
            r.clock.advance_ms(100);
            r.supervisor.refresh(CoreId::Core1);
            assert_eq!(r.supervisor.refresh(CoreId::Core0), KickOutcome::Kicked);
            last_kick = r.clock.now_us();
        }

        // Core 1 goes silent; core 0 keeps refreshing every 100 ms
        let silent_from = r.clock.now_us();
        loop {
            r.clock.advance_ms(100);
            let outcome = r.supervisor.refresh(CoreId::Core0);
            let silent_for = r.clock.now_us() - silent_from;
            if silent_for < 2_000_000 {
                assert_eq!(outcome, KickOutcome::Kicked);
                last_kick = r.clock.now_us();
            } else {
                assert!(matches!(outcome, KickOutcome::PeerStale { .. }));
            }
            if r.watchdog.expired() {
                break;
            }
            assert!(r.clock.now_us() - silent_from < 10_000_000);
        }

        // Fired exactly one timeout after the last kick, at 100 ms resolution
        assert_eq!(r.clock.now_us() - last_kick, 4_000_000);
        assert_eq!(r.watchdog.log.last_feed_us.get(), last_kick);
    }

    #[test]
    fn test_reset_cause() {
        let mut r = rig(WatchdogConfig::default());
        r.watchdog.cause = ResetCause::Watchdog;
        r.supervisor = WatchdogSupervisor::new(
            r.watchdog.clone(),
            None,
            r.clock.clone(),
            WatchdogConfig::default(),
        );
        assert_eq!(r.supervisor.reset_cause(), ResetCause::Watchdog);
    }

    #[test]
    fn test_check_in_tracking() {
        let r = rig(WatchdogConfig::default());
        r.supervisor.init();
        assert!(r.supervisor.has_checked_in(CoreId::Core0));
        assert!(!r.supervisor.has_checked_in(CoreId::Core1));

        // Core 1 silent through boot: stale, but never checked in
        r.clock.advance_ms(2_100);
        assert!(matches!(
            r.supervisor.refresh(CoreId::Core0),
            KickOutcome::PeerStale { .. }
        ));
        assert!(!r.supervisor.has_checked_in(CoreId::Core1));

        r.supervisor.refresh(CoreId::Core1);
        assert!(r.supervisor.has_checked_in(CoreId::Core1));
    }

    proptest! {
        /// A refresh kicks exactly when the other core's beat is under 2 s old,
        /// from either side.
        #[test]
        fn kick_iff_peer_fresh(
            start in any::<u32>(),
            peer_age in 0u32..5_000_000,
            core1_side in any::<bool>(),
        ) {
            let r = rig(WatchdogConfig::default());
            r.clock.set_us(start);
            r.supervisor.init();

            let (me, peer) = if core1_side {
                (CoreId::Core1, CoreId::Core0)
            } else {
                (CoreId::Core0, CoreId::Core1)
            };
            r.supervisor.refresh(peer);
            r.clock.advance_us(peer_age);

            let feeds = r.watchdog.log.feeds.get();
            let outcome = r.supervisor.refresh(me);
            if peer_age < 2_000_000 {
                prop_assert_eq!(outcome, KickOutcome::Kicked);
                prop_assert_eq!(r.watchdog.log.feeds.get(), feeds + 1);
            } else {
                prop_assert_eq!(outcome, KickOutcome::PeerStale { age_us: peer_age });
                prop_assert_eq!(r.watchdog.log.feeds.get(), feeds);
            }
        }
    }
}
