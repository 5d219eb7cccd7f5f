//! Zone header/commit subsystem
//!
//! Serializes the tuple store into a fixed-size zone image protected by a
//! header carrying magic, total length, CRC32 checksum, layout version and a
//! generation counter.
//!
//! # Invariants
//!
//! - A committed header's checksum always matches its region
//! - Header plus region never exceed the zone size; overflow fails the commit
//! - Committing an unchanged store rewrites identical bytes
//! - Temporary tuples are never written

mod checksum;
mod errors;
mod header;
mod nvram;
mod reader;
mod summary;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{Severity, ZoneError, ZoneErrorCode, ZoneResult};
pub use header::{encode_image, ZoneHeader, ERASED_BYTE, HEADER_LEN, ZONE_MAGIC, ZONE_VERSION};
pub use nvram::{Nvram, NvramZone};
pub use reader::{ZoneReader, ZoneSnapshot};
pub use summary::{SummaryTuple, ZoneSummary};
