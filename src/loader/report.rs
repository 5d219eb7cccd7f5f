//! Load results
//!
//! A load never fails as a whole. Everything that was skipped ends up here
//! as a diagnostic, in the order it was encountered.

use std::fmt;
use std::path::PathBuf;

use super::errors::LoadError;
use crate::tuple::TupleError;
use crate::validator::NameViolation;

/// What went wrong with a line or file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Admitted key failed the name grammar
    IllegalName { name: String, reason: NameViolation },
    /// The store refused the property
    Rejected { name: String, error: TupleError },
    /// Non-empty line without `=`
    MissingEquals(String),
    /// A file or import was not loaded
    FileSkipped(LoadError),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::IllegalName { name, reason } => {
                write!(f, "Illegal property name \"{}\": {}", name, reason)
            }
            DiagnosticKind::Rejected { name, error } => {
                write!(f, "Property \"{}\" rejected: {}", name, error)
            }
            DiagnosticKind::MissingEquals(line) => {
                write!(f, "Ignoring line without '=': \"{}\"", line)
            }
            DiagnosticKind::FileSkipped(err) => write!(f, "{}", err),
        }
    }
}

/// A diagnostic with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    pub source: PathBuf,
    /// `None` for file-level problems and values closed by end of input
    pub line: Option<usize>,
    pub kind: DiagnosticKind,
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.source.display(), line, self.kind),
            None => write!(f, "{}: {}", self.source.display(), self.kind),
        }
    }
}

/// Outcome of loading a property file and its imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Files read and parsed, imports included
    pub files_loaded: usize,
    /// Physical lines processed
    pub lines: usize,
    /// Properties written to the store
    pub applied: usize,
    /// Properties dropped by a filter
    pub filtered_out: usize,
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl LoadReport {
    /// True when nothing was skipped except by filters.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics about skipped files.
    pub fn skipped_files(&self) -> impl Iterator<Item = &LoadError> {
        self.diagnostics.iter().filter_map(|d| match &d.kind {
            DiagnosticKind::FileSkipped(err) => Some(err),
            _ => None,
        })
    }
}
