//! Disk I/O and file lifecycle.
//!
//! Creates the staging and destination directories, owns the append-only
//! staging file of each in-flight task, and moves or discards it once the
//! task is terminal.

mod place;
mod writer;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use place::{discard, move_into};
pub use writer::StagingFile;

/// Mode for directories we create: rwx for the owner, r-x for group and other.
pub const DIR_MODE: u32 = 0o755;

/// Filesystem failure on a staging file or one of the batch directories.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open staging file {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to move {} to {}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to delete {}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates `path` and any missing parents with [`DIR_MODE`].
pub fn ensure_dir(path: &Path) -> Result<(), StorageError> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path).map_err(|source| StorageError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
