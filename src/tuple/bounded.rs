//! Length-bounded string types for tuple names and values
//!
//! Construction fails when the input is longer than the bound. Nothing is
//! ever truncated.

use std::borrow::Borrow;
use std::fmt;

use super::errors::{TupleError, TupleResult};
use crate::validator::{validate_property_name, MAX_NAME_LEN};

/// Maximum length of a tuple value in bytes.
pub const MAX_VALUE_LEN: usize = 255;

/// A string of at most `N` bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedString<const N: usize>(String);

/// Input was longer than the bound of a `BoundedString`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundExceeded {
    pub max: usize,
    pub actual: usize,
}

impl<const N: usize> BoundedString<N> {
    /// The bound in bytes.
    pub const MAX: usize = N;

    pub fn new(s: impl Into<String>) -> Result<Self, BoundExceeded> {
        let s = s.into();
        if s.len() > N {
            return Err(BoundExceeded {
                max: N,
                actual: s.len(),
            });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A property name that satisfies the name grammar.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleName(BoundedString<MAX_NAME_LEN>);

impl TupleName {
    /// Validates `name` and wraps it.
    pub fn parse(name: &str) -> TupleResult<Self> {
        validate_property_name(name).map_err(|reason| TupleError::InvalidName {
            name: name.to_string(),
            reason,
        })?;
        // Length is already covered by the grammar check.
        let bounded = BoundedString::new(name).map_err(|e| TupleError::InvalidName {
            name: name.to_string(),
            reason: crate::validator::NameViolation::TooLong { len: e.actual },
        })?;
        Ok(Self(bounded))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Borrow<str> for TupleName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TupleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tuple value: at most 255 bytes, no NUL.
///
/// NUL terminates records in the zone region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleValue(BoundedString<MAX_VALUE_LEN>);

impl TupleValue {
    /// Checks `value` for the owner `name` and wraps it.
    pub fn parse(name: &str, value: &str) -> TupleResult<Self> {
        if value.as_bytes().contains(&0) {
            return Err(TupleError::ValueContainsNul {
                name: name.to_string(),
            });
        }
        let bounded = BoundedString::new(value).map_err(|e| TupleError::ValueTooLong {
            name: name.to_string(),
            len: e.actual,
        })?;
        Ok(Self(bounded))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TupleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
