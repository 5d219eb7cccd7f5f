//! Property name validator
//!
//! A legal property name:
//! - is 1 to 63 bytes long
//! - does not start or end with `.`
//! - never contains `..`
//! - uses only ASCII letters, ASCII digits, `.`, `-` and `_`
//!
//! Validation is pure and deterministic. The loader calls it before
//! handing a property to the store, and `TupleName` calls it again on
//! construction so an illegal name can never reach a zone image.

use std::fmt;

/// Maximum length of a property name in bytes.
pub const MAX_NAME_LEN: usize = 63;

/// Why a property name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameViolation {
    /// Zero-length name
    Empty,
    /// Longer than `MAX_NAME_LEN` bytes
    TooLong { len: usize },
    /// First character is `.`
    LeadingDot,
    /// Last character is `.`
    TrailingDot,
    /// `..` at the given byte offset
    ConsecutiveDots { offset: usize },
    /// Character outside the allowed set
    IllegalChar { ch: char, offset: usize },
}

impl fmt::Display for NameViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameViolation::Empty => write!(f, "name is empty"),
            NameViolation::TooLong { len } => {
                write!(f, "name is {} bytes, maximum is {}", len, MAX_NAME_LEN)
            }
            NameViolation::LeadingDot => write!(f, "name starts with '.'"),
            NameViolation::TrailingDot => write!(f, "name ends with '.'"),
            NameViolation::ConsecutiveDots { offset } => {
                write!(f, "consecutive dots at offset {}", offset)
            }
            NameViolation::IllegalChar { ch, offset } => {
                write!(f, "illegal character {:?} at offset {}", ch, offset)
            }
        }
    }
}

/// Checks `name` against the property name grammar.
///
/// Returns the first violation found, scanning left to right after the
/// length and boundary checks.
pub fn validate_property_name(name: &str) -> Result<(), NameViolation> {
    let bytes = name.as_bytes();

    if bytes.is_empty() {
        return Err(NameViolation::Empty);
    }
    if bytes.len() > MAX_NAME_LEN {
        return Err(NameViolation::TooLong { len: bytes.len() });
    }
    if bytes[0] == b'.' {
        return Err(NameViolation::LeadingDot);
    }
    if bytes[bytes.len() - 1] == b'.' {
        return Err(NameViolation::TrailingDot);
    }

    let mut prev_dot = false;
    for (offset, ch) in name.char_indices() {
        if ch == '.' {
            if prev_dot {
                return Err(NameViolation::ConsecutiveDots { offset: offset - 1 });
            }
            prev_dot = true;
            continue;
        }
        prev_dot = false;

        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            continue;
        }
        return Err(NameViolation::IllegalChar { ch, offset });
    }

    Ok(())
}

/// Convenience wrapper returning only whether `name` is legal.
pub fn is_legal_property_name(name: &str) -> bool {
    validate_property_name(name).is_ok()
}
