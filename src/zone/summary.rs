//! Operator-facing dump of a zone session

use std::fmt;

use serde::Serialize;

/// One tuple as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTuple {
    pub name: String,
    pub value: String,
    pub temporary: bool,
}

/// Tuples and space accounting of a zone session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneSummary {
    pub path: String,
    pub size: usize,
    pub used_bytes: usize,
    pub free_bytes: usize,
    /// `None` until the first generate
    pub generation: Option<u32>,
    pub checksum: Option<u32>,
    pub tuples: Vec<SummaryTuple>,
}

impl fmt::Display for ZoneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tuple in &self.tuples {
            if tuple.temporary {
                writeln!(f, "{}={} (temporary)", tuple.name, tuple.value)?;
            } else {
                writeln!(f, "{}={}", tuple.name, tuple.value)?;
            }
        }
        write!(
            f,
            "size: {} bytes ({} left)",
            self.used_bytes, self.free_bytes
        )?;
        if let (Some(generation), Some(checksum)) = (self.generation, self.checksum) {
            write!(f, ", generation {}, checksum {:08x}", generation, checksum)?;
        }
        Ok(())
    }
}
