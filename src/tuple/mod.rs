//! Tuple store subsystem
//!
//! Name/value records with a persistence attribute. Names are unique and
//! always satisfy the property name grammar; values are bounded to 255 bytes.

mod bounded;
mod errors;
mod store;

pub use bounded::{BoundExceeded, BoundedString, TupleName, TupleValue, MAX_VALUE_LEN};
pub use errors::{TupleError, TupleResult};
pub use store::{Tuple, TupleAttr, TupleStore};
