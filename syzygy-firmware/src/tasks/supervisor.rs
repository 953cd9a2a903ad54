//! Primary-core watchdog refresh

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use syzygy_core::supervision::{CoreId, KickOutcome};

use crate::channels::Supervisor;

/// Refresh interval in milliseconds
pub const REFRESH_INTERVAL_MS: u64 = 100;

/// Refresh from core 0 every 100 ms
///
/// While core 1 is silent the refresh stops kicking and the watchdog is
/// left to reset the chip. Core 1 does not check in until its startup
/// grace is over, so silence within `boot_window` of start-up is expected
/// and only logged at debug level.
#[embassy_executor::task]
pub async fn supervisor_task(supervisor: &'static Supervisor, boot_window: Duration) {
    info!("Supervisor task started");

    let booted_at = Instant::now();
    let mut ticker = Ticker::every(Duration::from_millis(REFRESH_INTERVAL_MS));
    let mut stale = false;

    loop {
        ticker.next().await;

        match supervisor.refresh(CoreId::Core0) {
            KickOutcome::Kicked => {
                if stale {
                    info!("Core 1 heartbeat recovered");
                    stale = false;
                }
            }
            KickOutcome::PeerStale { age_us } => {
                if stale {
                    continue;
                }
                let booting = !supervisor.has_checked_in(CoreId::Core1)
                    && booted_at.elapsed() < boot_window;
                if booting {
                    debug!("Core 1 not checked in yet (startup grace), kick withheld");
                } else {
                    warn!(
                        "Core 1 heartbeat stale ({} ms), watchdog will reset in {} ms",
                        age_us / 1_000,
                        supervisor.config().timeout_ms
                    );
                    stale = true;
                }
            }
            KickOutcome::Disarmed => {}
        }
    }
}
