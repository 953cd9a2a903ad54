//! State shared between the two cores
//!
//! The reading board and freeze switch are plain atomics and live in
//! statics. The supervisor owns peripherals, so it is created at boot and
//! parked in a `StaticCell`.

use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;

use syzygy_core::acquisition::ReadingBoard;
use syzygy_core::supervision::{FreezeSwitch, WatchdogSupervisor};
use syzygy_hal_rp2040::{EmbassyClock, Rp2040Watchdog};

/// Watchdog supervisor as instantiated on the RP2040
pub type Supervisor =
    WatchdogSupervisor<CriticalSectionRawMutex, Rp2040Watchdog, Output<'static>, EmbassyClock>;

/// Latest reading per channel, written by core 1 and read by core 0
pub static READINGS: ReadingBoard = ReadingBoard::new();

/// Parks core 1 when set (watchdog test)
pub static FREEZE: FreezeSwitch = FreezeSwitch::new();

/// Supervisor shared by both cores
pub static SUPERVISOR: StaticCell<Supervisor> = StaticCell::new();
