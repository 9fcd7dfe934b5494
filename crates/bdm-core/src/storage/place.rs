//! Moving finished staging files into place, and discarding dead ones.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::StorageError;

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(_e: &io::Error) -> bool {
    false
}

/// Moves `staging` into `dest_dir` under the same file name and returns the new path.
///
/// A file already at the target is removed first. Falls back to copy + remove
/// when the two directories are on different filesystems.
pub fn move_into(staging: &Path, dest_dir: &Path) -> Result<PathBuf, StorageError> {
    let target = match staging.file_name() {
        Some(name) => dest_dir.join(name),
        None => {
            return Err(StorageError::Move {
                from: staging.to_path_buf(),
                to: dest_dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "staging path has no file name"),
            })
        }
    };
    let move_err = |source| StorageError::Move {
        from: staging.to_path_buf(),
        to: target.clone(),
        source,
    };

    match fs::remove_file(&target) {
        Ok(()) => tracing::debug!("replaced existing {}", target.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(move_err(e)),
    }

    match fs::rename(staging, &target) {
        Ok(()) => {}
        Err(e) if is_cross_device(&e) => {
            fs::copy(staging, &target).map_err(move_err)?;
            fs::remove_file(staging).map_err(move_err)?;
        }
        Err(e) => return Err(move_err(e)),
    }
    Ok(target)
}

/// Deletes a staging file. Returns false if it was already gone.
pub fn discard(path: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StorageError::Delete {
            path: path.to_path_buf(),
            source,
        }),
    }
}
