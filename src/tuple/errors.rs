//! Tuple store errors

use thiserror::Error;

use crate::validator::NameViolation;

/// Result type for tuple store operations
pub type TupleResult<T> = Result<T, TupleError>;

/// Tuple store errors.
///
/// None of these are fatal: the caller skips the offending tuple.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TupleError {
    #[error("Illegal property name '{name}': {reason}")]
    InvalidName { name: String, reason: NameViolation },

    #[error("Value too long for '{name}': {len} bytes (max: 255)")]
    ValueTooLong { name: String, len: usize },

    #[error("Value for '{name}' contains a NUL byte")]
    ValueContainsNul { name: String },

    #[error("Tuple not found: {0}")]
    NotFound(String),

    #[error("Tuple region needs {required} bytes but only {capacity} are available")]
    CapacityExceeded { required: usize, capacity: usize },
}
