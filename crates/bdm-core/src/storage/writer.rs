//! Append-only writer for a staging file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::StorageError;

/// Staging file of one transfer attempt. Opened in append mode and never
/// truncated on open, so bytes from earlier runs or attempts are kept. The
/// handle is closed when the value is dropped.
#[derive(Debug)]
pub struct StagingFile {
    file: File,
    path: PathBuf,
    len_at_open: u64,
    written: u64,
}

impl StagingFile {
    /// Opens (creating if needed) `path` for append and records its current length.
    pub fn open_append(path: &Path) -> Result<Self, StorageError> {
        let open_err = |source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        let len_at_open = file.metadata().map_err(open_err)?.len();
        Ok(StagingFile {
            file,
            path: path.to_path_buf(),
            len_at_open,
            written: 0,
        })
    }

    /// Length of the file when it was opened.
    pub fn len_at_open(&self) -> u64 {
        self.len_at_open
    }

    /// Bytes appended through this handle.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `data` at the end of the file.
    pub fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Drops everything on disk so the next append starts at offset 0.
    /// Used when a server answers a range request with the full body.
    pub fn restart(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        self.len_at_open = 0;
        self.written = 0;
        Ok(())
    }
}
