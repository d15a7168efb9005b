//! One-pass decode of an S-record stream into records and an image.

use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{debug, info, warn};

use crate::assembler::ImageAssembler;
use crate::config::SrecConfig;
use crate::error::{Field, FieldError, SrecError};
use crate::image::Image;
use crate::record::{parse_record, DataRecord, FooterRecord, HeaderRecord, Record};

/// A decoded S-record file.
///
/// Records are kept as decoded; the image is assembled once from the data
/// records and afterwards only changed through [`SrecFile::set_bytes`].
#[derive(Debug, Clone)]
pub struct SrecFile {
    header: Option<HeaderRecord>,
    data_records: Vec<DataRecord>,
    footer: Option<FooterRecord>,
    image: Image,
}

impl SrecFile {
    /// Open and decode a file from disk
    pub fn open(path: &Path, config: &SrecConfig) -> Result<Self, SrecError> {
        debug!("Loading S-record file: {}", path.display());
        let file = File::open(path)?;
        Self::parse(BufReader::new(file), config)
    }

    /// Decode from a reader. Lines are split on `\n` with a trailing `\r`
    /// dropped; bytes are not required to be UTF-8.
    pub fn parse<R: BufRead>(reader: R, config: &SrecConfig) -> Result<Self, SrecError> {
        let lines = reader.split(b'\n').map(|line| {
            line.map(|mut bytes| {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                bytes
            })
        });
        Self::parse_lines(lines, config)
    }

    pub fn parse_str(text: &str, config: &SrecConfig) -> Result<Self, SrecError> {
        Self::parse_lines(text.lines().map(Ok::<_, io::Error>), config)
    }

    /// Decode lines in order, then assemble the image.
    ///
    /// The first bad line aborts the whole decode.
    pub fn parse_lines<I, S>(lines: I, config: &SrecConfig) -> Result<Self, SrecError>
    where
        I: IntoIterator<Item = io::Result<S>>,
        S: AsRef<[u8]>,
    {
        let mut header: Option<HeaderRecord> = None;
        let mut footer: Option<FooterRecord> = None;
        let mut data_records = Vec::new();

        for (ix, line) in lines.into_iter().enumerate() {
            let line = line?;
            let line: &[u8] = line.as_ref();
            let line_no = ix + 1;

            if line.is_empty() {
                if config.skip_blank_lines {
                    continue;
                }
                return Err(SrecError::Format {
                    line: line_no,
                    error: FieldError::Truncated {
                        field: Field::Type,
                        needed: 2,
                        actual: 0,
                    },
                });
            }

            let record = parse_record(line).map_err(|error| SrecError::Format {
                line: line_no,
                error,
            })?;
            match record {
                Record::Header(rec) => {
                    if header.is_some() {
                        warn!("line {}: extra S0 header ignored", line_no);
                        continue;
                    }
                    if rec.address() != 0 {
                        warn!(
                            "line {}: S0 header has non-zero address 0x{:04X}",
                            line_no,
                            rec.address()
                        );
                    }
                    header = Some(rec);
                }
                Record::Data(rec) => data_records.push(rec),
                Record::Footer(rec) => {
                    if footer.is_some() {
                        warn!("line {}: extra termination record ignored", line_no);
                        continue;
                    }
                    footer = Some(rec);
                }
                Record::Ignored(record_type) => {
                    debug!("line {}: skipping {} record", line_no, record_type.tag());
                }
            }
        }

        if config.verify_checksums {
            verify_all(header.as_ref(), &data_records, footer.as_ref())?;
        }

        let image = ImageAssembler::from_config(config).assemble(&data_records)?;
        info!(
            "Decoded {} data records into {}",
            data_records.len(),
            image
        );

        Ok(SrecFile {
            header,
            data_records,
            footer,
            image,
        })
    }

    pub fn header(&self) -> Option<&HeaderRecord> {
        self.header.as_ref()
    }

    pub fn data_records(&self) -> &[DataRecord] {
        &self.data_records
    }

    pub fn footer(&self) -> Option<&FooterRecord> {
        self.footer.as_ref()
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn into_image(self) -> Image {
        self.image
    }

    pub fn start_address(&self) -> u32 {
        self.image.start_address()
    }

    pub fn end_address(&self) -> u32 {
        self.image.end_address()
    }

    pub fn bytes(&self) -> &[u8] {
        self.image.bytes()
    }

    pub fn set_bytes(&mut self, address: u32, data: &[u8]) -> Result<(), SrecError> {
        self.image.set_bytes(address, data)
    }

    /// Compare every stored checksum against the computed one.
    ///
    /// Decoding never does this unless `verify_checksums` is configured.
    pub fn verify_checksums(&self) -> Result<(), SrecError> {
        verify_all(
            self.header.as_ref(),
            &self.data_records,
            self.footer.as_ref(),
        )
    }

    /// Data record payloads concatenated in file order, cut at `byte_size`.
    ///
    /// Addresses are ignored, so gaps are not padded.
    pub fn data_prefix(&self, byte_size: usize) -> Vec<u8> {
        self.data_records
            .iter()
            .flat_map(|rec| rec.data().iter().copied())
            .take(byte_size)
            .collect()
    }
}

fn verify_all(
    header: Option<&HeaderRecord>,
    data_records: &[DataRecord],
    footer: Option<&FooterRecord>,
) -> Result<(), SrecError> {
    if let Some(header) = header {
        header.verify_checksum()?;
    }
    for rec in data_records {
        rec.verify_checksum()?;
    }
    if let Some(footer) = footer {
        footer.verify_checksum()?;
    }
    Ok(())
}

impl FromStr for SrecFile {
    type Err = SrecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SrecFile::parse_str(s, &SrecConfig::default())
    }
}

impl Display for SrecFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = Vec::new();
        for rec in &self.data_records {
            let tag = rec.kind().record_type().tag();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        let header = match &self.header {
            Some(header) => header.text(),
            None => String::from("(none)"),
        };
        let entry = match &self.footer {
            Some(footer) => format!(
                "0x{:08X} ({})",
                footer.entry_address(),
                footer.kind().record_type().tag()
            ),
            None => String::from("(none)"),
        };
        write!(
            f,
            "Module name:    {}
Data records:   {} ({})
Start address:  0x{:08X}
End address:    0x{:08X}
Image size:     {} bytes
Entry address:  {}
",
            header,
            self.data_records.len(),
            tags.join(", "),
            self.image.start_address(),
            self.image.end_address(),
            self.image.len(),
            entry,
        )
    }
}
