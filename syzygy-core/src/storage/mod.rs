//! Persistent settings storage
//!
//! [`FlashEeprom`] keeps a RAM image of one flash sector and implements the
//! byte-addressable [`SettingsStore`](syzygy_hal::SettingsStore) on top of
//! it. [`save_blob`] and [`load_blob`] frame a single checksummed record
//! inside any settings store.

pub mod blob;
pub mod crc;
pub mod eeprom;

pub use blob::{load_blob, save_blob, StoreError, BLOB_HEADER_LEN};
pub use crc::crc16_update;
pub use eeprom::{FlashEeprom, DEFAULT_CAPACITY};
