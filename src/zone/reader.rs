//! Zone reader with strict validation
//!
//! A zone is accepted only if:
//! - the magic matches and the version is known
//! - `total_length` covers at least the header and a terminator and fits the image
//! - the region checksum matches the header
//! - the region decodes into `name=value` records ending with an empty record
//!
//! Anything else is corruption and the whole image is rejected.

use std::fs;
use std::path::Path;

use super::checksum::compute_checksum;
use super::errors::{ZoneError, ZoneResult};
use super::header::{ZoneHeader, ERASED_BYTE, HEADER_LEN, ZONE_MAGIC, ZONE_VERSION};

/// A validated zone image decoded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSnapshot {
    pub header: ZoneHeader,
    /// Tuples in region order
    pub tuples: Vec<(String, String)>,
}

impl ZoneSnapshot {
    /// Exact-match lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tuples
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Reads and validates zone images.
pub struct ZoneReader;

impl ZoneReader {
    /// Reads the image at `path` and validates it.
    pub fn read(path: &Path) -> ZoneResult<ZoneSnapshot> {
        let data = fs::read(path).map_err(|e| {
            ZoneError::read_failed(format!("Failed to read zone image: {}", path.display()), e)
        })?;
        Self::from_bytes(&data)
    }

    /// Validates an in-memory image.
    pub fn from_bytes(data: &[u8]) -> ZoneResult<ZoneSnapshot> {
        let header = ZoneHeader::deserialize(data).ok_or_else(|| {
            ZoneError::corruption(format!(
                "Truncated zone: {} bytes, header needs {}",
                data.len(),
                HEADER_LEN
            ))
        })?;

        if header.magic != ZONE_MAGIC {
            if data[..HEADER_LEN].iter().all(|b| *b == ERASED_BYTE) {
                return Err(ZoneError::corruption("Zone is erased"));
            }
            return Err(ZoneError::corruption_at_offset(
                0,
                format!("Bad magic: {:02x?}", header.magic),
            ));
        }

        if header.version != ZONE_VERSION {
            return Err(ZoneError::corruption_at_offset(
                12,
                format!("Unsupported zone version: {}", header.version),
            ));
        }

        let total_length = header.total_length as usize;
        if total_length <= HEADER_LEN || total_length > data.len() {
            return Err(ZoneError::corruption_at_offset(
                4,
                format!(
                    "Invalid total length {} for image of {} bytes",
                    total_length,
                    data.len()
                ),
            ));
        }

        let region = &data[HEADER_LEN..total_length];
        let computed = compute_checksum(region);
        if computed != header.checksum {
            return Err(ZoneError::corruption_at_offset(
                8,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed, header.checksum
                ),
            ));
        }

        let tuples = decode_region(region)?;
        Ok(ZoneSnapshot { header, tuples })
    }
}

fn decode_region(region: &[u8]) -> ZoneResult<Vec<(String, String)>> {
    let mut tuples = Vec::new();
    let mut offset = 0;

    loop {
        let rest = &region[offset..];
        let end = rest.iter().position(|b| *b == 0).ok_or_else(|| {
            ZoneError::corruption_at_offset(HEADER_LEN + offset, "Unterminated record")
        })?;

        if end == 0 {
            // Empty record terminates the region.
            return Ok(tuples);
        }

        let record = std::str::from_utf8(&rest[..end]).map_err(|e| {
            ZoneError::corruption_at_offset(HEADER_LEN + offset, format!("Invalid UTF-8: {}", e))
        })?;
        let (name, value) = record.split_once('=').ok_or_else(|| {
            ZoneError::corruption_at_offset(HEADER_LEN + offset, "Record without '='")
        })?;
        tuples.push((name.to_string(), value.to_string()));

        offset += end + 1;
    }
}
