//! Reading property files
//!
//! - symlinks are refused
//! - group- or world-writable files are refused (unix)
//! - invalid UTF-8 is replaced, never fatal

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use super::errors::{LoadError, LoadResult};

/// Reads a property file into a string.
pub fn read_property_file(path: &Path) -> LoadResult<String> {
    let unreadable = |e: std::io::Error| LoadError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let link_meta = fs::symlink_metadata(path).map_err(unreadable)?;
    if link_meta.file_type().is_symlink() {
        return Err(LoadError::Symlink {
            path: path.to_path_buf(),
        });
    }

    let mut file = File::open(path).map_err(unreadable)?;
    let meta = file.metadata().map_err(unreadable)?;
    check_permissions(path, &meta)?;

    let mut bytes = Vec::with_capacity(meta.len() as usize);
    file.read_to_end(&mut bytes).map_err(unreadable)?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(unix)]
fn check_permissions(path: &Path, meta: &fs::Metadata) -> LoadResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    if mode & 0o022 != 0 {
        return Err(LoadError::InsecurePermissions {
            path: path.to_path_buf(),
            mode,
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path, _meta: &fs::Metadata) -> LoadResult<()> {
    Ok(())
}
