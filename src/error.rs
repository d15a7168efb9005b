// S-record decode and image errors

use std::fmt;
use std::io;

/// Fixed-width field of a record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Type,
    Length,
    Address,
    Data,
    Checksum,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Field::Type => "type",
            Field::Length => "length",
            Field::Address => "address",
            Field::Data => "data",
            Field::Checksum => "checksum",
        };
        write!(f, "{}", name)
    }
}

/// Failure decoding the fields of a single record line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    UnknownType(String),
    NoAddressWidth(String),
    InvalidHex { field: Field, offset: usize },
    Truncated { field: Field, needed: usize, actual: usize },
    LengthTooSmall { length: u8, minimum: u8 },
}

impl FieldError {
    /// The field this error points at.
    pub fn field(&self) -> Field {
        match self {
            FieldError::UnknownType(_) | FieldError::NoAddressWidth(_) => Field::Type,
            FieldError::InvalidHex { field, .. } => *field,
            FieldError::Truncated { field, .. } => *field,
            FieldError::LengthTooSmall { .. } => Field::Length,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldError::UnknownType(tag) => {
                write!(f, "'{}' is not a valid record type", tag)
            }
            FieldError::NoAddressWidth(tag) => {
                write!(f, "record type {} has no address field width", tag)
            }
            FieldError::InvalidHex { field, offset } => {
                write!(f, "invalid hex digit in {} field at column {}", field, offset + 1)
            }
            FieldError::Truncated {
                field,
                needed,
                actual,
            } => {
                write!(
                    f,
                    "line too short for {} field: needs {} characters, has {}",
                    field, needed, actual
                )
            }
            FieldError::LengthTooSmall { length, minimum } => {
                write!(
                    f,
                    "length field 0x{:02X} is smaller than the minimum 0x{:02X}",
                    length, minimum
                )
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Error categories callers can match on without caring about details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Ordering,
    EmptyInput,
    Range,
    Checksum,
    Io,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrecError {
    // Decode errors
    Format { line: usize, error: FieldError },

    // Assembly errors
    NoDataRecords,
    NotAscending { index: usize, previous: u32, address: u32 },
    RecordOutOfRange { address: u32, start: u32, end: u32 },
    RecordOverrun { address: u32, len: usize, size: usize },
    ImageTooLarge { size: u64, limit: u64 },

    // Patch errors
    AddressOutOfRange { address: u32, start: u32, end: u32 },
    WriteOverrun { address: u32, len: usize, end: u32 },

    // Opt-in verification
    ChecksumMismatch { record: String, stored: u8, computed: u8 },

    Io(String),
    Config(String),
}

impl SrecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SrecError::Format { .. } => ErrorKind::Format,
            SrecError::NoDataRecords => ErrorKind::EmptyInput,
            SrecError::NotAscending { .. }
            | SrecError::RecordOutOfRange { .. }
            | SrecError::RecordOverrun { .. } => ErrorKind::Ordering,
            SrecError::AddressOutOfRange { .. }
            | SrecError::WriteOverrun { .. }
            | SrecError::ImageTooLarge { .. } => ErrorKind::Range,
            SrecError::ChecksumMismatch { .. } => ErrorKind::Checksum,
            SrecError::Io(_) => ErrorKind::Io,
            SrecError::Config(_) => ErrorKind::Config,
        }
    }
}

impl fmt::Display for SrecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SrecError::Format { line, error } => {
                write!(f, "Format error on line {}: {}", line, error)
            }
            SrecError::NoDataRecords => {
                write!(f, "No data records (S1/S2/S3) in input")
            }
            SrecError::NotAscending {
                index,
                previous,
                address,
            } => {
                write!(
                    f,
                    "Data record addresses not ascending: record {} at 0x{:08X} follows 0x{:08X}",
                    index, address, previous
                )
            }
            SrecError::RecordOutOfRange {
                address,
                start,
                end,
            } => {
                write!(
                    f,
                    "Data record address 0x{:08X} is outside image range 0x{:08X}-0x{:08X}",
                    address, start, end
                )
            }
            SrecError::RecordOverrun { address, len, size } => {
                write!(
                    f,
                    "Data record at 0x{:08X} with {} bytes runs past the {}-byte image",
                    address, len, size
                )
            }
            SrecError::ImageTooLarge { size, limit } => {
                write!(
                    f,
                    "Image of {} bytes exceeds the {}-byte limit",
                    size, limit
                )
            }
            SrecError::AddressOutOfRange {
                address,
                start,
                end,
            } => {
                write!(
                    f,
                    "Address 0x{:08X} is out of image range 0x{:08X}-0x{:08X}",
                    address, start, end
                )
            }
            SrecError::WriteOverrun { address, len, end } => {
                write!(
                    f,
                    "Write of {} bytes at 0x{:08X} runs past image end 0x{:08X}",
                    len, address, end
                )
            }
            SrecError::ChecksumMismatch {
                record,
                stored,
                computed,
            } => {
                write!(
                    f,
                    "Checksum mismatch in {}: stored 0x{:02X}, computed 0x{:02X}",
                    record, stored, computed
                )
            }
            SrecError::Io(msg) => write!(f, "IO error: {}", msg),
            SrecError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for SrecError {}

impl From<io::Error> for SrecError {
    fn from(err: io::Error) -> Self {
        SrecError::Io(err.to_string())
    }
}
