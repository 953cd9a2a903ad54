//! Persistent settings abstractions
//!
//! Settings are exposed as a small byte-addressable store with a running
//! checksum, the same shape as an AVR EEPROM. Chip HALs back it with
//! whatever non-volatile memory they have; on the RP2040 that is one
//! erase sector at the top of the QSPI flash.

/// Errors from flash operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Read failed
    Read,
    /// Sector erase failed
    Erase,
    /// Program (write) failed
    Program,
    /// Address or length outside the storage partition
    OutOfBounds,
}

/// Byte-addressable persistent settings store
///
/// Every byte moved in either direction folds into a caller-owned CRC-16,
/// so a caller can write a block, then re-read it with `copy = false` to
/// validate it without touching its own buffers.
///
/// Accesses must be bracketed by [`SettingsStore::begin_access`] and
/// [`SettingsStore::end_access`]. Writes become durable in `end_access`.
pub trait SettingsStore {
    /// Total addressable bytes
    fn capacity(&self) -> usize;

    /// Prepare for a batch of reads or writes
    fn begin_access(&mut self) -> Result<(), FlashError>;

    /// Finish a batch, committing any pending writes
    fn end_access(&mut self) -> Result<(), FlashError>;

    /// Write `data` at `*pos`, advancing `*pos` past it
    ///
    /// Bytes beyond [`SettingsStore::capacity`] are dropped but still
    /// advance the position and the checksum.
    fn write_bytes(&mut self, pos: &mut usize, data: &[u8], crc: &mut u16);

    /// Read `buf.len()` bytes at `*pos`, advancing `*pos` past them
    ///
    /// When `copy` is false the bytes only feed the checksum and `buf` is
    /// left untouched. Bytes beyond the capacity read as `0xFF`.
    fn read_bytes(&mut self, pos: &mut usize, buf: &mut [u8], crc: &mut u16, copy: bool);
}
