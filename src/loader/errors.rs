//! Property loading errors
//!
//! None of these abort a build: the affected file or import is skipped and
//! loading continues.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for property file access
pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Cannot read property file {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Refusing to follow symlink {}", path.display())]
    Symlink { path: PathBuf },

    #[error("Skipping insecure file {}: mode {mode:o} is group- or world-writable", path.display())]
    InsecurePermissions { path: PathBuf, mode: u32 },

    #[error("Import depth exceeded at {} (max: {max_depth})", path.display())]
    ImportDepthExceeded { path: PathBuf, max_depth: usize },
}

impl LoadError {
    /// Path of the file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Unreadable { path, .. }
            | LoadError::Symlink { path }
            | LoadError::InsecurePermissions { path, .. }
            | LoadError::ImportDepthExceeded { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insecure_display_uses_octal_mode() {
        let err = LoadError::InsecurePermissions {
            path: PathBuf::from("/tmp/a.prop"),
            mode: 0o100666,
        };
        assert!(err.to_string().contains("100666"));
    }

    #[test]
    fn test_depth_display() {
        let err = LoadError::ImportDepthExceeded {
            path: PathBuf::from("loop.prop"),
            max_depth: 16,
        };
        assert_eq!(err.to_string(), "Import depth exceeded at loop.prop (max: 16)");
        assert_eq!(err.path(), Path::new("loop.prop"));
    }
}
