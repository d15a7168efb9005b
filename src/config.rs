//! Decode options, loadable from a TOML file.
//!
//! ```toml
//! fill_byte = 0xFF
//! write_bounds = "strict"
//! verify_checksums = true
//! skip_blank_lines = true
//! max_image_size = 0x100000
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SrecError;
use crate::image::WriteBounds;

/// Sentinel for addresses no data record wrote.
pub const DEFAULT_FILL_BYTE: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SrecConfig {
    pub fill_byte: u8,
    pub write_bounds: WriteBounds,
    /// Run the checksum pass after decoding and fail on a mismatch.
    pub verify_checksums: bool,
    /// Skip empty lines instead of rejecting them.
    pub skip_blank_lines: bool,
    /// Refuse to allocate an image larger than this many bytes.
    pub max_image_size: Option<u64>,
}

impl Default for SrecConfig {
    fn default() -> Self {
        SrecConfig {
            fill_byte: DEFAULT_FILL_BYTE,
            write_bounds: WriteBounds::Lenient,
            verify_checksums: false,
            skip_blank_lines: true,
            max_image_size: None,
        }
    }
}

impl SrecConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, SrecError> {
        toml::from_str(text).map_err(|e| SrecError::Config(e.to_string()))
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self, SrecError> {
        let text = fs::read_to_string(path).map_err(|e| {
            SrecError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}
