//! Record checksum computation.
//!
//! The checksum is the ones' complement of the low byte of the sum of the
//! length, address and data bytes. Decoding stores the checksum field as-is;
//! comparing it against the computed value is a separate, opt-in step.

use crate::error::SrecError;

/// Compute the checksum over a record's length, address and data.
///
/// `address_bytes` is the width of the address field in bytes; only that
/// many low-order bytes of `address` are summed.
pub fn compute(length: u8, address: u32, address_bytes: usize, data: &[u8]) -> u8 {
    let mut sum = length;
    for b in &address.to_be_bytes()[4 - address_bytes..] {
        sum = sum.wrapping_add(*b);
    }
    for b in data {
        sum = sum.wrapping_add(*b);
    }
    !sum
}

/// Compare a stored checksum against the computed one.
pub fn verify(record: &str, stored: u8, computed: u8) -> Result<(), SrecError> {
    if stored != computed {
        return Err(SrecError::ChecksumMismatch {
            record: record.to_string(),
            stored,
            computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use test_log::test;

    #[test]
    fn test_compute_known_records() {
        // S1 0x1F @ 0x0000, hello-world style payload
        let data = [
            0x7C, 0x08, 0x02, 0xA6, 0x90, 0x01, 0x00, 0x04, 0x94, 0x21, 0xFF, 0xF0, 0x7C, 0x6C,
            0x1B, 0x78, 0x7C, 0x8C, 0x23, 0x78, 0x3C, 0x60, 0x00, 0x00, 0x38, 0x63, 0x00, 0x00,
        ];
        assert_eq!(compute(0x1F, 0x0000, 2, &data), 0x26);

        // S9 entry 0x0000 with no data
        assert_eq!(compute(0x03, 0x0000, 2, &[]), 0xFC);

        // S3 @ 0x08000000
        assert_eq!(compute(0x09, 0x0800_0000, 4, &[0x10, 0x20, 0x30, 0x40]), 0x4E);
    }

    #[test]
    fn test_only_low_address_bytes_summed() {
        // The upper byte must not contribute for a 3-byte address
        assert_eq!(
            compute(0x08, 0xFF01_2340, 3, &[0xDE, 0xAD, 0xBE, 0xEF]),
            compute(0x08, 0x0001_2340, 3, &[0xDE, 0xAD, 0xBE, 0xEF])
        );
        assert_eq!(compute(0x08, 0x0001_2340, 3, &[0xDE, 0xAD, 0xBE, 0xEF]), 0x5B);
    }

    #[test]
    fn test_verify() {
        assert!(verify("S1 @ 0x0000", 0x26, 0x26).is_ok());
        let err = verify("S1 @ 0x0000", 0x40, 0x3E).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Checksum);
        assert!(err.to_string().contains("stored 0x40, computed 0x3E"));
    }
}
