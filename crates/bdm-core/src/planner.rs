//! Resume planning: where a URL is staged and where its transfer restarts.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::{StagingFile, StorageError};
use crate::task::TransferTask;
use crate::url_model::{self, InvalidUrlError};

/// Why a task could not be created.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrlError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A task together with its open staging file. The file is the task's only
/// handle on disk and is closed when the transfer lets go of it.
#[derive(Debug)]
pub struct PreparedTask {
    pub task: TransferTask,
    pub file: StagingFile,
}

/// Maps URLs to staging files and derives resume offsets from what is on disk.
#[derive(Debug, Clone)]
pub struct ResumePlanner {
    staging_dir: PathBuf,
}

impl ResumePlanner {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Staging path for `url`. Touches neither the network nor the disk.
    pub fn staging_path(&self, url: &str) -> Result<PathBuf, InvalidUrlError> {
        let name = url_model::file_name_for_url(url)?;
        Ok(self.staging_dir.join(name))
    }

    /// Creates the first attempt for `url`, opening its staging file for append.
    pub fn prepare(&self, index: usize, url: &str) -> Result<PreparedTask, PlanError> {
        let file_path = self.staging_path(url)?;
        Ok(self.open(index, url.to_string(), file_path, 0)?)
    }

    /// Creates the attempt after `prev`. The offset is read again because the
    /// failed attempt may have appended to the file.
    pub fn successor(&self, prev: &TransferTask) -> Result<PreparedTask, StorageError> {
        self.open(
            prev.index,
            prev.url.clone(),
            prev.file_path.clone(),
            prev.attempt + 1,
        )
    }

    fn open(
        &self,
        index: usize,
        url: String,
        file_path: PathBuf,
        attempt: u32,
    ) -> Result<PreparedTask, StorageError> {
        let file = StagingFile::open_append(&file_path)?;
        let task = TransferTask {
            index,
            url,
            file_path,
            resume_offset: file.len_at_open(),
            attempt,
        };
        if task.resumed() {
            tracing::debug!(
                "{} resuming {} at byte {}",
                task.id(),
                task.url,
                task.resume_offset
            );
        }
        Ok(PreparedTask { task, file })
    }
}
