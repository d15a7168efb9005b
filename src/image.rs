//! Dense, address-indexed byte image and its patch surface.

use std::fmt::{self, Display, Formatter};

use log::debug;
use serde::Deserialize;

use crate::error::SrecError;

/// How far past `end_address` a patch may reach.
///
/// `end_address` is the address of the last data record, so the final
/// record's payload lies partly beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteBounds {
    /// Only the start address is range-checked. The write may run into the
    /// last record's payload but never past the end of the buffer.
    #[default]
    Lenient,
    /// Every written byte must lie at or below `end_address`.
    Strict,
}

/// The assembled image.
///
/// Unwritten addresses hold the fill byte. The buffer is sized once at
/// assembly and never reallocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    start_address: u32,
    end_address: u32,
    bytes: Vec<u8>,
    write_bounds: WriteBounds,
}

impl Image {
    pub(crate) fn new(
        start_address: u32,
        end_address: u32,
        bytes: Vec<u8>,
        write_bounds: WriteBounds,
    ) -> Self {
        Image {
            start_address,
            end_address,
            bytes,
            write_bounds,
        }
    }

    /// Address of the first data record.
    pub fn start_address(&self) -> u32 {
        self.start_address
    }

    /// Address of the last data record in file order.
    pub fn end_address(&self) -> u32 {
        self.end_address
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn write_bounds(&self) -> WriteBounds {
        self.write_bounds
    }

    pub fn set_write_bounds(&mut self, write_bounds: WriteBounds) {
        self.write_bounds = write_bounds;
    }

    /// Whether `address` falls inside the dense buffer.
    pub fn contains(&self, address: u32) -> bool {
        address >= self.start_address
            && ((address - self.start_address) as usize) < self.bytes.len()
    }

    pub fn byte_at(&self, address: u32) -> Option<u8> {
        if !self.contains(address) {
            return None;
        }
        Some(self.bytes[(address - self.start_address) as usize])
    }

    /// Borrow `len` bytes starting at `address`.
    ///
    /// A read running past the buffer reports its start address.
    pub fn read(&self, address: u32, len: usize) -> Result<&[u8], SrecError> {
        let offset = self.offset_of(address)?;
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(SrecError::AddressOutOfRange {
                address,
                start: self.start_address,
                end: self.last_address(),
            })?;
        Ok(&self.bytes[offset..end])
    }

    /// Overwrite `data.len()` bytes starting at `address`.
    ///
    /// `address` must lie within `[start_address, end_address]`. How far the
    /// write may extend past `end_address` depends on [`WriteBounds`].
    pub fn set_bytes(&mut self, address: u32, data: &[u8]) -> Result<(), SrecError> {
        if self.bytes.is_empty() {
            return Err(SrecError::NoDataRecords);
        }
        if address < self.start_address || address > self.end_address {
            return Err(SrecError::AddressOutOfRange {
                address,
                start: self.start_address,
                end: self.end_address,
            });
        }
        if data.is_empty() {
            return Ok(());
        }

        let offset = (address - self.start_address) as usize;
        let last = address as u64 + data.len() as u64 - 1;
        let overrun = match self.write_bounds {
            WriteBounds::Strict => last > self.end_address as u64,
            WriteBounds::Lenient => false,
        };
        let fits = offset
            .checked_add(data.len())
            .map_or(false, |end| end <= self.bytes.len());
        if overrun || !fits {
            return Err(SrecError::WriteOverrun {
                address,
                len: data.len(),
                end: self.end_address,
            });
        }

        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        debug!("patched {} bytes at 0x{:08X}", data.len(), address);
        Ok(())
    }

    // Last address backed by the buffer.
    fn last_address(&self) -> u32 {
        self.start_address
            .wrapping_add(self.bytes.len() as u32)
            .wrapping_sub(1)
    }

    fn offset_of(&self, address: u32) -> Result<usize, SrecError> {
        if !self.contains(address) {
            return Err(SrecError::AddressOutOfRange {
                address,
                start: self.start_address,
                end: self.last_address(),
            });
        }
        Ok((address - self.start_address) as usize)
    }
}

impl Display for Image {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "image 0x{:08X}-0x{:08X}, {} bytes",
            self.start_address,
            self.end_address,
            self.bytes.len()
        )
    }
}
