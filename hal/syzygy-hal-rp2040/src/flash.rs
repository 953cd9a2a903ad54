//! Settings sector in on-board flash
//!
//! The store occupies the last 4 KiB erase sector of the 2 MB QSPI flash.
//! Blocking erase/program pause core 1 for the duration (embassy-rp's
//! flash driver handles that), which is far shorter than the watchdog
//! liveness window.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use syzygy_core::storage::{FlashEeprom, DEFAULT_CAPACITY};
use syzygy_hal::FlashError;

/// Flash size on the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the settings sector
pub const SETTINGS_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Blocking flash driver
pub type SettingsFlash<'d> = Flash<'d, FLASH, Blocking, FLASH_SIZE>;

/// Settings store on the last flash sector
pub type SettingsSector<'d> = FlashEeprom<SettingsFlash<'d>, DEFAULT_CAPACITY>;

/// Open the settings store
///
/// Must be used from core 0 only.
pub fn settings_sector(flash: Peri<'_, FLASH>) -> Result<SettingsSector<'_>, FlashError> {
    FlashEeprom::new(Flash::new_blocking(flash), SETTINGS_OFFSET)
}
