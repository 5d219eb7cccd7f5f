//! CLI module for gen_nvram_zone
//!
//! Parses arguments, builds the zone image and prints the resulting tuple
//! set. Exit status is 0 on success and 1 on usage, init or commit failure.

mod args;
mod build;
mod config;
mod errors;
mod io;

pub use args::{parse_size, Cli};
pub use build::{build_zone, run, BuildOutcome};
pub use config::BuildConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{build_response, write_error, write_summary};
