//! Fixed-column field decoding for a single S-record line.
//!
//! A record line is laid out as
//!
//! ```text
//! Stt ll aaaa[aa[aa]] dd... cc
//! ```
//!
//! where `tt` is the type digit, `ll` the number of bytes that follow
//! (address + data + checksum), `a` the address field, `d` the payload and
//! `cc` the checksum. All fields are hex ASCII and sliced by column.

use crate::error::{Field, FieldError};

pub const TYPE_FIELD_LEN: usize = 2;
pub const LENGTH_FIELD_LEN: usize = 2;
pub const CHECKSUM_FIELD_LEN: usize = 2;

/// Column where the address field begins.
pub const ADDRESS_FIELD_START: usize = TYPE_FIELD_LEN + LENGTH_FIELD_LEN;

/// The ten record type tags `S0` through `S9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
}

impl RecordType {
    /// Classify the first two characters of a line.
    pub fn from_line(line: &[u8]) -> Result<RecordType, FieldError> {
        if line.len() < TYPE_FIELD_LEN {
            return Err(FieldError::Truncated {
                field: Field::Type,
                needed: TYPE_FIELD_LEN,
                actual: line.len(),
            });
        }
        let tag = &line[..TYPE_FIELD_LEN];
        let record_type = match tag {
            b"S0" => RecordType::S0,
            b"S1" => RecordType::S1,
            b"S2" => RecordType::S2,
            b"S3" => RecordType::S3,
            b"S4" => RecordType::S4,
            b"S5" => RecordType::S5,
            b"S6" => RecordType::S6,
            b"S7" => RecordType::S7,
            b"S8" => RecordType::S8,
            b"S9" => RecordType::S9,
            _ => {
                return Err(FieldError::UnknownType(
                    String::from_utf8_lossy(tag).into_owned(),
                ))
            }
        };
        Ok(record_type)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            RecordType::S0 => "S0",
            RecordType::S1 => "S1",
            RecordType::S2 => "S2",
            RecordType::S3 => "S3",
            RecordType::S4 => "S4",
            RecordType::S5 => "S5",
            RecordType::S6 => "S6",
            RecordType::S7 => "S7",
            RecordType::S8 => "S8",
            RecordType::S9 => "S9",
        }
    }
}

/// Width in hex characters of the address field of header and data records.
pub fn address_field_width(record_type: RecordType) -> Result<usize, FieldError> {
    match record_type {
        RecordType::S0 | RecordType::S1 => Ok(4),
        RecordType::S2 => Ok(6),
        RecordType::S3 => Ok(8),
        other => Err(FieldError::NoAddressWidth(other.tag().to_string())),
    }
}

/// Width in hex characters of the entry address of a termination record.
pub fn entry_address_width(record_type: RecordType) -> Result<usize, FieldError> {
    match record_type {
        RecordType::S7 => Ok(8),
        RecordType::S8 => Ok(6),
        RecordType::S9 => Ok(4),
        other => Err(FieldError::NoAddressWidth(other.tag().to_string())),
    }
}

/// Decode `width` hex characters starting at column `start`.
///
/// `width` must not exceed 8 so the value fits a `u32`.
pub fn hex_value(line: &[u8], start: usize, width: usize, field: Field) -> Result<u32, FieldError> {
    let end = start + width;
    if line.len() < end {
        return Err(FieldError::Truncated {
            field,
            needed: end,
            actual: line.len(),
        });
    }
    let mut value: u32 = 0;
    for (ix, b) in line[start..end].iter().enumerate() {
        let digit = (*b as char)
            .to_digit(16)
            .ok_or(FieldError::InvalidHex {
                field,
                offset: start + ix,
            })?;
        value = (value << 4) | digit;
    }
    Ok(value)
}

/// Decode the two hex characters at column `start` as one byte.
pub fn hex_byte(line: &[u8], start: usize, field: Field) -> Result<u8, FieldError> {
    hex_value(line, start, 2, field).map(|v| v as u8)
}

/// Decoded fields of one address-bearing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields {
    pub length: u8,
    pub address: u32,
    pub data: Vec<u8>,
    pub checksum: u8,
}

/// Slices the length, address, data and checksum fields out of one line.
///
/// The type tag has already been classified by the caller, which also
/// supplies the address field width for that tag.
pub struct FieldDecoder<'a> {
    line: &'a [u8],
    address_width: usize,
    length: u8,
}

impl<'a> FieldDecoder<'a> {
    /// Read the length field and check the line is long enough to hold
    /// everything it declares.
    pub fn new(line: &'a [u8], address_width: usize) -> Result<Self, FieldError> {
        let length = hex_byte(line, TYPE_FIELD_LEN, Field::Length)?;
        let minimum = ((address_width + CHECKSUM_FIELD_LEN) / 2) as u8;
        if length < minimum {
            return Err(FieldError::LengthTooSmall { length, minimum });
        }
        let decoder = FieldDecoder {
            line,
            address_width,
            length,
        };
        let needed = decoder.record_end();
        if line.len() < needed {
            return Err(FieldError::Truncated {
                field: decoder.field_at(line.len()),
                needed,
                actual: line.len(),
            });
        }
        Ok(decoder)
    }

    /// Declared byte count of address + data + checksum.
    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn address(&self) -> Result<u32, FieldError> {
        hex_value(
            self.line,
            ADDRESS_FIELD_START,
            self.address_width,
            Field::Address,
        )
    }

    /// Payload bytes in address-ascending order.
    pub fn data(&self) -> Result<Vec<u8>, FieldError> {
        (self.data_start()..self.checksum_start())
            .step_by(2)
            .map(|col| hex_byte(self.line, col, Field::Data))
            .collect()
    }

    pub fn checksum(&self) -> Result<u8, FieldError> {
        hex_byte(self.line, self.checksum_start(), Field::Checksum)
    }

    /// Number of characters past the declared record end.
    pub fn trailing(&self) -> usize {
        self.line.len() - self.record_end()
    }

    pub fn decode(&self) -> Result<Fields, FieldError> {
        Ok(Fields {
            length: self.length,
            address: self.address()?,
            data: self.data()?,
            checksum: self.checksum()?,
        })
    }

    fn data_start(&self) -> usize {
        ADDRESS_FIELD_START + self.address_width
    }

    fn checksum_start(&self) -> usize {
        self.record_end() - CHECKSUM_FIELD_LEN
    }

    fn record_end(&self) -> usize {
        ADDRESS_FIELD_START + self.length as usize * 2
    }

    // Which field a line ending at `len` characters cuts into.
    fn field_at(&self, len: usize) -> Field {
        if len < self.data_start() {
            Field::Address
        } else if len < self.checksum_start() {
            Field::Data
        } else {
            Field::Checksum
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_record_type_tags() {
        assert_eq!(RecordType::from_line(b"S1130000").unwrap(), RecordType::S1);
        assert_eq!(RecordType::from_line(b"S9030000FC").unwrap(), RecordType::S9);
        assert_eq!(RecordType::S5.tag(), "S5");

        let err = RecordType::from_line(b"X1130000").unwrap_err();
        assert_eq!(err, FieldError::UnknownType("X1".to_string()));

        // Lowercase tags are not accepted
        assert!(RecordType::from_line(b"s1130000").is_err());

        let err = RecordType::from_line(b"S").unwrap_err();
        assert_eq!(err.field(), Field::Type);
    }

    #[test]
    fn test_address_widths() {
        assert_eq!(address_field_width(RecordType::S0).unwrap(), 4);
        assert_eq!(address_field_width(RecordType::S1).unwrap(), 4);
        assert_eq!(address_field_width(RecordType::S2).unwrap(), 6);
        assert_eq!(address_field_width(RecordType::S3).unwrap(), 8);
        assert!(address_field_width(RecordType::S5).is_err());
        assert!(address_field_width(RecordType::S9).is_err());

        assert_eq!(entry_address_width(RecordType::S7).unwrap(), 8);
        assert_eq!(entry_address_width(RecordType::S8).unwrap(), 6);
        assert_eq!(entry_address_width(RecordType::S9).unwrap(), 4);
        assert!(entry_address_width(RecordType::S1).is_err());
    }

    #[test]
    fn test_hex_value() {
        assert_eq!(hex_value(b"S1abCD", 2, 4, Field::Address).unwrap(), 0xABCD);
        assert_eq!(hex_byte(b"S1FF", 2, Field::Length).unwrap(), 0xFF);

        let err = hex_value(b"S10G", 2, 2, Field::Length).unwrap_err();
        assert_eq!(
            err,
            FieldError::InvalidHex {
                field: Field::Length,
                offset: 3
            }
        );

        let err = hex_value(b"S1", 2, 2, Field::Length).unwrap_err();
        assert_eq!(err.field(), Field::Length);
    }

    #[test]
    fn test_decode_s1_fields() {
        let line = b"S1130000214601360021470136007EFE09D2190140";
        let decoder = FieldDecoder::new(line, 4).unwrap();
        let fields = decoder.decode().unwrap();
        assert_eq!(fields.length, 0x13);
        assert_eq!(fields.address, 0x0000);
        assert_eq!(
            fields.data,
            vec![
                0x21, 0x46, 0x01, 0x36, 0x00, 0x21, 0x47, 0x01, 0x36, 0x00, 0x7E, 0xFE, 0x09,
                0xD2, 0x19, 0x01
            ]
        );
        assert_eq!(fields.checksum, 0x40);
        assert_eq!(decoder.trailing(), 0);
    }

    #[test]
    fn test_decode_s3_fields() {
        let decoder = FieldDecoder::new(b"S30908000000102030404E", 8).unwrap();
        let fields = decoder.decode().unwrap();
        assert_eq!(fields.address, 0x0800_0000);
        assert_eq!(fields.data, vec![0x10, 0x20, 0x30, 0x40]);
        assert_eq!(fields.checksum, 0x4E);
    }

    #[test]
    fn test_empty_payload() {
        let decoder = FieldDecoder::new(b"S1030010EC", 4).unwrap();
        assert!(decoder.data().unwrap().is_empty());
    }

    #[test]
    fn test_truncated_line_names_field() {
        // Declares 7 bytes but the checksum is missing
        let err = FieldDecoder::new(b"S107000001020304", 4).err().unwrap();
        assert_eq!(
            err,
            FieldError::Truncated {
                field: Field::Checksum,
                needed: 18,
                actual: 16
            }
        );

        let err = FieldDecoder::new(b"S1070000010", 4).err().unwrap();
        assert_eq!(err.field(), Field::Data);

        let err = FieldDecoder::new(b"S10700", 4).err().unwrap();
        assert_eq!(err.field(), Field::Address);
    }

    #[test]
    fn test_length_too_small() {
        let err = FieldDecoder::new(b"S3030000", 8).err().unwrap();
        assert_eq!(
            err,
            FieldError::LengthTooSmall {
                length: 3,
                minimum: 5
            }
        );
    }

    #[test]
    fn test_bad_hex_in_data() {
        let decoder = FieldDecoder::new(b"S1070000010Z0304EE", 4).unwrap();
        let err = decoder.data().unwrap_err();
        assert_eq!(
            err,
            FieldError::InvalidHex {
                field: Field::Data,
                offset: 11
            }
        );
    }

    #[test]
    fn test_trailing_characters_counted() {
        let decoder = FieldDecoder::new(b"S107000001020304EEXX", 4).unwrap();
        assert_eq!(decoder.trailing(), 2);
        assert_eq!(decoder.checksum().unwrap(), 0xEE);
    }
}
