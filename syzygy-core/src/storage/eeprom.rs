//! EEPROM emulation on one NOR flash sector
//!
//! The whole store lives in a RAM image. The image is loaded from flash on
//! the first `begin_access` and written back by `end_access`, only if a byte
//! actually changed. Writing back is a full sector erase followed by a
//! program of the image, so an unchanged store never wears the flash.
//!
//! On the RP2040 the erase and program run from RAM with XIP disabled and
//! the other core paused. A 4 KiB sector erase plus program takes well under
//! 100 ms, far inside the watchdog liveness window.

use embedded_storage::nor_flash::NorFlash;
use syzygy_hal::{FlashError, SettingsStore};

use super::crc::crc16_update;

/// Default store size, one RP2040 erase sector
pub const DEFAULT_CAPACITY: usize = 4096;

/// Byte-addressable settings store backed by one flash sector
pub struct FlashEeprom<F, const N: usize = DEFAULT_CAPACITY> {
    flash: F,
    offset: u32,
    image: [u8; N],
    loaded: bool,
    dirty: bool,
}

impl<F: NorFlash, const N: usize> FlashEeprom<F, N> {
    /// Create a store over the erase sector starting at `offset`
    ///
    /// The sector must be erase-aligned, inside the device, and large
    /// enough for the image.
    pub fn new(flash: F, offset: u32) -> Result<Self, FlashError> {
        let start = offset as usize;
        if start % F::ERASE_SIZE != 0
            || N > F::ERASE_SIZE
            || N % F::WRITE_SIZE != 0
            || N % F::READ_SIZE != 0
            || start + F::ERASE_SIZE > flash.capacity()
        {
            return Err(FlashError::OutOfBounds);
        }

        Ok(Self {
            flash,
            offset,
            image: [0xFF; N],
            loaded: false,
            dirty: false,
        })
    }

    /// Check if the image holds changes not yet written to flash
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn sector_end(&self) -> u32 {
        self.offset + F::ERASE_SIZE as u32
    }
}

impl<F: NorFlash, const N: usize> SettingsStore for FlashEeprom<F, N> {
    fn capacity(&self) -> usize {
        N
    }

    fn begin_access(&mut self) -> Result<(), FlashError> {
        if !self.loaded {
            self.flash
                .read(self.offset, &mut self.image)
                .map_err(|_| FlashError::Read)?;
            self.loaded = true;
        }
        Ok(())
    }

    fn end_access(&mut self) -> Result<(), FlashError> {
        if !self.dirty {
            return Ok(());
        }

        self.flash
            .erase(self.offset, self.sector_end())
            .map_err(|_| FlashError::Erase)?;
        self.flash
            .write(self.offset, &self.image)
            .map_err(|_| FlashError::Program)?;
        self.dirty = false;
        Ok(())
    }

    fn write_bytes(&mut self, pos: &mut usize, data: &[u8], crc: &mut u16) {
        for &byte in data {
            if let Some(slot) = self.image.get_mut(*pos) {
                if *slot != byte {
                    *slot = byte;
                    self.dirty = true;
                }
            }
            *crc = crc16_update(*crc, &[byte]);
            *pos += 1;
        }
    }

    fn read_bytes(&mut self, pos: &mut usize, buf: &mut [u8], crc: &mut u16, copy: bool) {
        for out in buf.iter_mut() {
            let byte = self.image.get(*pos).copied().unwrap_or(0xFF);
            if copy {
                *out = byte;
            }
            *crc = crc16_update(*crc, &[byte]);
            *pos += 1;
        }
    }
}
