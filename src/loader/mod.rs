//! Property loader subsystem
//!
//! Turns property text into tuple store mutations:
//!
//! ```text
//! # comment
//! import /path/to/other.prop [filter]
//! key = value
//! key = first line \
//! second line
//! ```
//!
//! Problems with single lines or files are reported in the `LoadReport` and
//! never abort a load.

mod driver;
mod errors;
mod filter;
mod lines;
mod parser;
mod report;
mod source;

pub use driver::{load_file, load_str, LoaderOptions, PropertyLoader, DEFAULT_MAX_IMPORT_DEPTH};
pub use errors::{LoadError, LoadResult};
pub use filter::PropertyFilter;
pub use lines::{Line, LineCursor};
pub use parser::{LineAction, ParserContext};
pub use report::{DiagnosticKind, LoadDiagnostic, LoadReport};
pub use source::read_property_file;
