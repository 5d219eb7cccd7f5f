//! Build configuration
//!
//! Assembled from the command line and validated before anything touches
//! the filesystem.

use std::path::PathBuf;

use serde::Serialize;

use super::args::Cli;
use super::errors::{CliError, CliResult};
use crate::loader::LoaderOptions;

/// Everything a zone build needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Zone size in bytes
    pub size: u64,
    /// Root property file
    pub config: PathBuf,
    /// Zone image path
    pub output: PathBuf,
    pub max_import_depth: usize,
    pub verbose: bool,
    pub json: bool,
}

impl BuildConfig {
    pub fn new(size: u64, config: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            size,
            config: config.into(),
            output: output.into(),
            max_import_depth: LoaderOptions::default().max_import_depth,
            verbose: false,
            json: false,
        }
    }

    /// Builds and validates the configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let config = Self {
            verbose: cli.verbose,
            json: cli.json,
            ..Self::new(cli.size, &cli.config, &cli.output)
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.size == 0 {
            return Err(CliError::usage("size must be greater than zero"));
        }
        if self.size > u64::from(u32::MAX) {
            return Err(CliError::usage(format!(
                "size {:#x} exceeds the 32-bit zone length",
                self.size
            )));
        }
        if self.config.as_os_str().is_empty() {
            return Err(CliError::usage("config path is empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(CliError::usage("output path is empty"));
        }
        if self.max_import_depth == 0 {
            return Err(CliError::usage("max_import_depth must be > 0"));
        }
        Ok(())
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            max_import_depth: self.max_import_depth,
        }
    }
}
