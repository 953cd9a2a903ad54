//! Checksummed record framing inside a settings store
//!
//! Layout, little-endian:
//!
//! ```text
//!   0      2      4
//!   ┌──────┬──────┬──────────────┐
//!   │ len  │ crc  │ payload ...  │
//!   └──────┴──────┴──────────────┘
//! ```
//!
//! `crc` is the CRC-16 of the payload starting from 0. An erased store
//! reads `len = 0xFFFF` and is reported as empty.

use syzygy_hal::{FlashError, SettingsStore};

/// Bytes taken by the record header
pub const BLOB_HEADER_LEN: usize = 4;

/// Errors saving or loading a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying flash operation failed
    Flash(FlashError),
    /// No record has been saved
    Empty,
    /// Record does not fit in the store or the caller's buffer
    TooLarge,
    /// Stored checksum does not match the payload
    Checksum,
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

/// Write `payload` as the store's record and commit it
pub fn save_blob<S: SettingsStore>(store: &mut S, payload: &[u8]) -> Result<(), StoreError> {
    let len = u16::try_from(payload.len()).map_err(|_| StoreError::TooLarge)?;
    if payload.len() + BLOB_HEADER_LEN > store.capacity() || len == u16::MAX {
        return Err(StoreError::TooLarge);
    }

    store.begin_access()?;

    let mut pos = BLOB_HEADER_LEN;
    let mut crc = 0;
    store.write_bytes(&mut pos, payload, &mut crc);

    let mut header = [0u8; BLOB_HEADER_LEN];
    header[..2].copy_from_slice(&len.to_le_bytes());
    header[2..].copy_from_slice(&crc.to_le_bytes());
    let mut pos = 0;
    let mut header_crc = 0;
    store.write_bytes(&mut pos, &header, &mut header_crc);

    store.end_access()?;
    Ok(())
}

/// Read the store's record into `buf`, returning its length
///
/// The payload is checksummed in place before anything is copied, so `buf`
/// is only written when the record is intact.
pub fn load_blob<S: SettingsStore>(store: &mut S, buf: &mut [u8]) -> Result<usize, StoreError> {
    store.begin_access()?;

    let mut header = [0u8; BLOB_HEADER_LEN];
    let mut pos = 0;
    let mut header_crc = 0;
    store.read_bytes(&mut pos, &mut header, &mut header_crc, true);

    let len = u16::from_le_bytes([header[0], header[1]]);
    let expected = u16::from_le_bytes([header[2], header[3]]);
    if len == u16::MAX {
        store.end_access()?;
        return Err(StoreError::Empty);
    }

    let len = usize::from(len);
    if len + BLOB_HEADER_LEN > store.capacity() || len > buf.len() {
        store.end_access()?;
        return Err(StoreError::TooLarge);
    }
    let out = &mut buf[..len];

    // Validation pass
    let mut crc = 0;
    store.read_bytes(&mut pos, out, &mut crc, false);
    if crc != expected {
        store.end_access()?;
        return Err(StoreError::Checksum);
    }

    let mut pos = BLOB_HEADER_LEN;
    let mut crc = 0;
    store.read_bytes(&mut pos, out, &mut crc, true);
    store.end_access()?;
    Ok(len)
}
