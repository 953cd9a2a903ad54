//! RP2040-specific HAL for the Syzygy firmware
//!
//! This crate provides RP2040 implementations of the shared `syzygy-hal`
//! traits:
//!
//! - ADC FIFO driven register-by-register (bounded polling)
//! - Hardware watchdog with reset-reason readout
//! - 32-bit microsecond clock on the embassy time driver
//! - Settings sector at the top of flash
//! - GPIOs handed out by number from the config

#![no_std]

pub mod adc;
pub mod clock;
pub mod flash;
pub mod pins;
pub mod watchdog;

pub use adc::Rp2040Adc;
pub use clock::EmbassyClock;
pub use flash::{settings_sector, SettingsFlash, SettingsSector};
pub use pins::{PinBank, PinError};
pub use watchdog::Rp2040Watchdog;
