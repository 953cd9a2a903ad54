//! CRC-16 used by the settings store
//!
//! Polynomial 0x1021, MSB first, no reflection and no final XOR. The
//! initial value is the caller's, which lets a checksum run across several
//! calls.

const POLY: u16 = 0x1021;

/// Fold `data` into `crc`
pub fn crc16_update(crc: u16, data: &[u8]) -> u16 {
    let mut crc = crc;

    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_vectors() {
        // CRC-16/XMODEM check value
        assert_eq!(crc16_update(0, b"123456789"), 0x31C3);
        // CRC-16/CCITT-FALSE check value
        assert_eq!(crc16_update(0xFFFF, b"123456789"), 0x29B1);
    }

    #[test]
    fn test_empty_is_identity() {
        assert_eq!(crc16_update(0x1234, &[]), 0x1234);
    }

    proptest! {
        /// Folding in pieces gives the same result as folding at once.
        #[test]
        fn split_folds_agree(data in proptest::collection::vec(any::<u8>(), 0..256), split in any::<prop::sample::Index>(), seed in any::<u16>()) {
            let at = split.index(data.len() + 1);
            let (head, tail) = data.split_at(at);
            prop_assert_eq!(
                crc16_update(crc16_update(seed, head), tail),
                crc16_update(seed, &data)
            );
        }
    }
}
