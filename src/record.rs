//! Record classification and the decoded record types.

use std::fmt::{self, Display, Formatter};

use log::trace;

use crate::checksum;
use crate::error::{FieldError, SrecError};
use crate::field::{address_field_width, entry_address_width, FieldDecoder, RecordType};

/// Addressing variant of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// S1, 16-bit address
    Addr16,
    /// S2, 24-bit address
    Addr24,
    /// S3, 32-bit address
    Addr32,
}

impl DataKind {
    pub fn record_type(&self) -> RecordType {
        match self {
            DataKind::Addr16 => RecordType::S1,
            DataKind::Addr24 => RecordType::S2,
            DataKind::Addr32 => RecordType::S3,
        }
    }

    /// Width of the address field in bytes.
    pub fn address_bytes(&self) -> usize {
        match self {
            DataKind::Addr16 => 2,
            DataKind::Addr24 => 3,
            DataKind::Addr32 => 4,
        }
    }
}

/// Addressing variant of a termination record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FooterKind {
    /// S7, 32-bit entry address
    Entry32,
    /// S8, 24-bit entry address
    Entry24,
    /// S9, 16-bit entry address
    Entry16,
}

impl FooterKind {
    pub fn record_type(&self) -> RecordType {
        match self {
            FooterKind::Entry32 => RecordType::S7,
            FooterKind::Entry24 => RecordType::S8,
            FooterKind::Entry16 => RecordType::S9,
        }
    }

    pub fn address_bytes(&self) -> usize {
        match self {
            FooterKind::Entry32 => 4,
            FooterKind::Entry24 => 3,
            FooterKind::Entry16 => 2,
        }
    }
}

/// S0 header record. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    length: u8,
    address: u16,
    data: Vec<u8>,
    checksum: u8,
}

impl HeaderRecord {
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Address field, conventionally zero.
    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Module name as text. Trailing NUL padding is dropped and other
    /// non-printable bytes are replaced.
    pub fn text(&self) -> String {
        let end = self
            .data
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |ix| ix + 1);
        self.data[..end]
            .iter()
            .map(|b| {
                if b.is_ascii() && !b.is_ascii_control() {
                    *b as char
                } else {
                    char::REPLACEMENT_CHARACTER
                }
            })
            .collect()
    }

    pub fn computed_checksum(&self) -> u8 {
        checksum::compute(self.length, self.address as u32, 2, &self.data)
    }

    pub fn verify_checksum(&self) -> Result<(), SrecError> {
        checksum::verify("S0 header", self.checksum, self.computed_checksum())
    }
}

/// S1/S2/S3 data record.
///
/// Built only by the parser; `length` always equals the address width in
/// bytes plus the data length plus one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    kind: DataKind,
    length: u8,
    address: u32,
    data: Vec<u8>,
    checksum: u8,
}

impl DataRecord {
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    pub fn computed_checksum(&self) -> u8 {
        checksum::compute(
            self.length,
            self.address,
            self.kind.address_bytes(),
            &self.data,
        )
    }

    pub fn verify_checksum(&self) -> Result<(), SrecError> {
        checksum::verify(&self.to_string(), self.checksum, self.computed_checksum())
    }
}

impl Display for DataRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ 0x{:08X} ({} bytes)",
            self.kind.record_type().tag(),
            self.address,
            self.data.len()
        )
    }
}

/// S7/S8/S9 termination record. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterRecord {
    kind: FooterKind,
    length: u8,
    entry_address: u32,
    checksum: u8,
}

impl FooterRecord {
    pub fn kind(&self) -> FooterKind {
        self.kind
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn entry_address(&self) -> u32 {
        self.entry_address
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    pub fn computed_checksum(&self) -> u8 {
        checksum::compute(
            self.length,
            self.entry_address,
            self.kind.address_bytes(),
            &[],
        )
    }

    pub fn verify_checksum(&self) -> Result<(), SrecError> {
        let label = format!("{} footer", self.kind.record_type().tag());
        checksum::verify(&label, self.checksum, self.computed_checksum())
    }
}

/// One classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header(HeaderRecord),
    Data(DataRecord),
    Footer(FooterRecord),
    /// S4, S5 and S6 lines, which carry nothing the image needs.
    Ignored(RecordType),
}

/// Classify and decode one record line.
///
/// The line is taken as raw bytes; anything outside hex ASCII in a numeric
/// field is an `InvalidHex` error for that field.
pub fn parse_record<L: AsRef<[u8]>>(line: L) -> Result<Record, FieldError> {
    let bytes: &[u8] = line.as_ref();
    let record_type = RecordType::from_line(bytes)?;
    let record = match record_type {
        RecordType::S0 => Record::Header(parse_header(bytes)?),
        RecordType::S1 => Record::Data(parse_data(bytes, DataKind::Addr16)?),
        RecordType::S2 => Record::Data(parse_data(bytes, DataKind::Addr24)?),
        RecordType::S3 => Record::Data(parse_data(bytes, DataKind::Addr32)?),
        RecordType::S4 | RecordType::S5 | RecordType::S6 => Record::Ignored(record_type),
        RecordType::S7 => Record::Footer(parse_footer(bytes, FooterKind::Entry32)?),
        RecordType::S8 => Record::Footer(parse_footer(bytes, FooterKind::Entry24)?),
        RecordType::S9 => Record::Footer(parse_footer(bytes, FooterKind::Entry16)?),
    };
    Ok(record)
}

fn decoder_for(line: &[u8], width: usize) -> Result<FieldDecoder<'_>, FieldError> {
    let decoder = FieldDecoder::new(line, width)?;
    if decoder.trailing() > 0 {
        trace!("ignoring {} characters past record end", decoder.trailing());
    }
    Ok(decoder)
}

fn parse_header(line: &[u8]) -> Result<HeaderRecord, FieldError> {
    let decoder = decoder_for(line, address_field_width(RecordType::S0)?)?;
    let fields = decoder.decode()?;
    Ok(HeaderRecord {
        length: fields.length,
        address: fields.address as u16,
        data: fields.data,
        checksum: fields.checksum,
    })
}

fn parse_data(line: &[u8], kind: DataKind) -> Result<DataRecord, FieldError> {
    let decoder = decoder_for(line, address_field_width(kind.record_type())?)?;
    let fields = decoder.decode()?;
    trace!(
        "{} record at 0x{:08X}, {} bytes",
        kind.record_type().tag(),
        fields.address,
        fields.data.len()
    );
    Ok(DataRecord {
        kind,
        length: fields.length,
        address: fields.address,
        data: fields.data,
        checksum: fields.checksum,
    })
}

// Any bytes between the entry address and checksum are dropped.
fn parse_footer(line: &[u8], kind: FooterKind) -> Result<FooterRecord, FieldError> {
    let decoder = decoder_for(line, entry_address_width(kind.record_type())?)?;
    Ok(FooterRecord {
        kind,
        length: decoder.length(),
        entry_address: decoder.address()?,
        checksum: decoder.checksum()?,
    })
}
