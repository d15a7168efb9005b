//! Sparse-to-dense materialization of data records.

use log::debug;

use crate::config::{SrecConfig, DEFAULT_FILL_BYTE};
use crate::error::SrecError;
use crate::image::{Image, WriteBounds};
use crate::record::DataRecord;

/// Builds an [`Image`] from data records in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageAssembler {
    fill_byte: u8,
    write_bounds: WriteBounds,
    max_image_size: Option<u64>,
}

impl Default for ImageAssembler {
    fn default() -> Self {
        ImageAssembler {
            fill_byte: DEFAULT_FILL_BYTE,
            write_bounds: WriteBounds::default(),
            max_image_size: None,
        }
    }
}

impl ImageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SrecConfig) -> Self {
        ImageAssembler {
            fill_byte: config.fill_byte,
            write_bounds: config.write_bounds,
            max_image_size: config.max_image_size,
        }
    }

    pub fn with_fill_byte(mut self, fill_byte: u8) -> Self {
        self.fill_byte = fill_byte;
        self
    }

    pub fn with_write_bounds(mut self, write_bounds: WriteBounds) -> Self {
        self.write_bounds = write_bounds;
        self
    }

    pub fn with_max_image_size(mut self, max_image_size: Option<u64>) -> Self {
        self.max_image_size = max_image_size;
        self
    }

    /// Validate record order and copy every payload into a filled buffer.
    ///
    /// The start and end addresses are taken from the first and last
    /// record positionally. The buffer spans from the start address to the
    /// end of the last record's payload; gaps keep the fill byte and later
    /// records overwrite earlier ones where they overlap.
    ///
    /// The whole span is allocated up front, so records at 0x00000000 and
    /// 0xFFFFFFF0 cost about 4 GiB. Set a `max_image_size` to refuse that
    /// before allocating.
    pub fn assemble(&self, records: &[DataRecord]) -> Result<Image, SrecError> {
        let (first, last) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SrecError::NoDataRecords),
        };
        check_ascending(records)?;

        let start_address = first.address();
        let end_address = last.address();
        let span = (end_address - start_address) as u64 + last.data().len() as u64;
        if let Some(limit) = self.max_image_size {
            if span > limit {
                return Err(SrecError::ImageTooLarge { size: span, limit });
            }
        }
        let size = usize::try_from(span).map_err(|_| SrecError::ImageTooLarge {
            size: span,
            limit: usize::MAX as u64,
        })?;
        debug!(
            "assembling {} records into 0x{:08X}-0x{:08X} ({} bytes)",
            records.len(),
            start_address,
            end_address,
            size
        );

        let mut bytes = vec![self.fill_byte; size];
        for rec in records {
            if rec.address() < start_address || rec.address() > end_address {
                return Err(SrecError::RecordOutOfRange {
                    address: rec.address(),
                    start: start_address,
                    end: end_address,
                });
            }
            let offset = (rec.address() - start_address) as usize;
            let end = offset + rec.data().len();
            if end > size {
                return Err(SrecError::RecordOverrun {
                    address: rec.address(),
                    len: rec.data().len(),
                    size,
                });
            }
            bytes[offset..end].copy_from_slice(rec.data());
        }

        Ok(Image::new(start_address, end_address, bytes, self.write_bounds))
    }
}

/// Check that record addresses never decrease in file order.
///
/// Equal neighbours are allowed. Nothing is re-sorted.
pub fn check_ascending(records: &[DataRecord]) -> Result<(), SrecError> {
    for (ix, pair) in records.windows(2).enumerate() {
        if pair[1].address() < pair[0].address() {
            return Err(SrecError::NotAscending {
                index: ix + 1,
                previous: pair[0].address(),
                address: pair[1].address(),
            });
        }
    }
    Ok(())
}
