//! Zone header and image layout
//!
//! ```text
//! +------------------+  offset 0
//! | Magic "FLSH"     |  [u8; 4]
//! +------------------+  offset 4
//! | Total Length     |  u32 LE, header + region
//! +------------------+  offset 8
//! | Checksum         |  u32 LE, CRC32 over the region
//! +------------------+  offset 12
//! | Version          |  u8
//! +------------------+  offset 13
//! | Generation       |  u32 LE
//! +------------------+  offset 17
//! | Region           |  name=value\0 ... \0
//! +------------------+  offset total_length
//! | Zero fill        |  up to the zone size
//! +------------------+
//! ```

use super::checksum::compute_checksum;

/// Zone magic.
pub const ZONE_MAGIC: [u8; 4] = *b"FLSH";

/// Layout version written by this crate.
pub const ZONE_VERSION: u8 = 1;

/// Serialized header length in bytes.
pub const HEADER_LEN: usize = 17;

/// Byte used for an erased zone.
pub const ERASED_BYTE: u8 = 0xFF;

/// Header prefixing the tuple region of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneHeader {
    pub magic: [u8; 4],
    pub total_length: u32,
    pub checksum: u32,
    pub version: u8,
    pub generation: u32,
}

impl ZoneHeader {
    /// Builds the header describing `region`.
    ///
    /// The caller guarantees `HEADER_LEN + region.len()` fits in a u32; the
    /// zone size itself is bounded to u32 at init.
    pub fn for_region(region: &[u8], generation: u32) -> Self {
        Self {
            magic: ZONE_MAGIC,
            total_length: (HEADER_LEN + region.len()) as u32,
            checksum: compute_checksum(region),
            version: ZONE_VERSION,
            generation,
        }
    }

    /// Length of the tuple region this header describes.
    pub fn region_len(&self) -> usize {
        (self.total_length as usize).saturating_sub(HEADER_LEN)
    }

    pub fn serialize(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.magic);
        buf[4..8].copy_from_slice(&self.total_length.to_le_bytes());
        buf[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        buf[12] = self.version;
        buf[13..17].copy_from_slice(&self.generation.to_le_bytes());
        buf
    }

    /// Parses the header fields. Returns `None` if `data` is shorter than a
    /// header. No field is validated here; see `ZoneReader`.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }
        let u32_at = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        Some(Self {
            magic: [data[0], data[1], data[2], data[3]],
            total_length: u32_at(4),
            checksum: u32_at(8),
            version: data[12],
            generation: u32_at(13),
        })
    }
}

/// Lays out a full zone image of `size` bytes: header, region, zero fill.
pub fn encode_image(header: &ZoneHeader, region: &[u8], size: usize) -> Vec<u8> {
    let mut image = Vec::with_capacity(size);
    image.extend_from_slice(&header.serialize());
    image.extend_from_slice(region);
    image.resize(size, 0);
    image
}
