//! In-memory tuple store
//!
//! Holds the name/value/attribute records for one session. The store is the
//! single source of truth until the zone manager serializes it; it is not
//! durable by itself.
//!
//! Tuples are kept ordered by name so `get_all` produces one canonical byte
//! layout for a given set of tuples.

use std::collections::BTreeMap;

use super::bounded::{TupleName, TupleValue};
use super::errors::{TupleError, TupleResult};

/// Persistence attribute of a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TupleAttr {
    /// Written to the zone on commit
    #[default]
    Persistent,
    /// Lives only for the session, never serialized by commit
    Temporary,
}

impl TupleAttr {
    pub fn is_temporary(self) -> bool {
        self == TupleAttr::Temporary
    }
}

/// One name/value/attribute record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub name: TupleName,
    pub value: TupleValue,
    pub attr: TupleAttr,
}

impl Tuple {
    /// Bytes this tuple occupies in the zone region: `name=value\0`.
    pub fn encoded_len(&self) -> usize {
        self.name.len() + 1 + self.value.len() + 1
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.name.as_str().as_bytes());
        buf.push(b'=');
        buf.extend_from_slice(self.value.as_str().as_bytes());
        buf.push(0);
    }
}

/// The tuple store.
#[derive(Debug, Default)]
pub struct TupleStore {
    tuples: BTreeMap<TupleName, Tuple>,
}

impl TupleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tuples.get(name).map(|t| t.value.as_str())
    }

    /// Returns the full tuple for `name`.
    pub fn get_tuple(&self, name: &str) -> Option<&Tuple> {
        self.tuples.get(name)
    }

    /// Inserts or replaces the tuple for `name`.
    ///
    /// The name grammar and both length bounds are checked here even though
    /// the loader validates first. Overlong input is rejected, never truncated.
    pub fn set(&mut self, name: &str, value: &str, attr: TupleAttr) -> TupleResult<()> {
        let name = TupleName::parse(name)?;
        let value = TupleValue::parse(name.as_str(), value)?;

        let tuple = Tuple {
            name: name.clone(),
            value,
            attr,
        };
        self.tuples.insert(name, tuple);
        Ok(())
    }

    /// Removes the tuple for `name`.
    pub fn unset(&mut self, name: &str) -> TupleResult<()> {
        match self.tuples.remove(name) {
            Some(_) => Ok(()),
            None => Err(TupleError::NotFound(name.to_string())),
        }
    }

    /// Serializes tuples into the zone region layout.
    ///
    /// Layout: `name=value\0` for each tuple in name order, then a single
    /// `\0`. Temporary tuples are skipped unless `include_temp` is set; they
    /// stay in the store either way.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` when the layout is longer than `capacity` bytes.
    pub fn get_all(&self, capacity: usize, include_temp: bool) -> TupleResult<Vec<u8>> {
        let required = self.encoded_len(include_temp);
        if required > capacity {
            return Err(TupleError::CapacityExceeded { required, capacity });
        }

        let mut buf = Vec::with_capacity(required);
        for tuple in self.visible(include_temp) {
            tuple.encode_into(&mut buf);
        }
        buf.push(0);

        Ok(buf)
    }

    /// Length of the layout `get_all` would produce.
    pub fn encoded_len(&self, include_temp: bool) -> usize {
        self.visible(include_temp)
            .map(Tuple::encoded_len)
            .sum::<usize>()
            + 1
    }

    /// Empties the store.
    pub fn reset(&mut self) {
        self.tuples.clear();
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// All tuples in name order, temporary ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.values()
    }

    fn visible(&self, include_temp: bool) -> impl Iterator<Item = &Tuple> {
        self.tuples
            .values()
            .filter(move |t| include_temp || !t.attr.is_temporary())
    }
}
