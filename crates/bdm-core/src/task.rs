//! Transfer tasks: one value per attempt at downloading one URL.
//!
//! A task is never mutated once submitted. A retry is a new task with the
//! same index and URL and `attempt + 1`.

use std::fmt;
use std::path::PathBuf;

use crate::retry::TransferError;

/// Identity of one attempt: submission index plus attempt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub index: usize,
    pub attempt: u32,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.attempt)
    }
}

/// Lifecycle of a URL lineage across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InFlight,
    Succeeded,
    /// Attempt failed; a successor attempt follows.
    Failed,
    /// Failed with no retry budget left.
    Exhausted,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Exhausted)
    }
}

/// One attempt at downloading `url` into `file_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTask {
    /// Position of the URL in the submitted batch.
    pub index: usize,
    pub url: String,
    /// Staging file; a pure function of `url`.
    pub file_path: PathBuf,
    /// Bytes already on disk when the attempt started.
    pub resume_offset: u64,
    /// 0 for the first attempt.
    pub attempt: u32,
}

impl TransferTask {
    pub fn id(&self) -> TaskId {
        TaskId {
            index: self.index,
            attempt: self.attempt,
        }
    }

    pub fn resumed(&self) -> bool {
        self.resume_offset > 0
    }

    /// Value for curl's range option (`<offset>-`), sent as `Range: bytes=<offset>-`.
    pub fn range(&self) -> Option<String> {
        self.resumed().then(|| format!("{}-", self.resume_offset))
    }
}

/// Terminal result of a URL lineage, handed from the engine to finalization.
#[derive(Debug)]
pub struct TaskResult {
    /// The last attempt.
    pub task: TransferTask,
    /// `Succeeded` or `Exhausted`.
    pub state: TaskState,
    /// HTTP status of the last attempt (None if no response was received).
    pub status: Option<u32>,
    /// Why the last attempt failed (None on success).
    pub error: Option<TransferError>,
    /// True if the last attempt continued an existing partial file.
    pub resumed: bool,
    pub bytes_received: u64,
}

impl TaskResult {
    pub fn attempts(&self) -> u32 {
        self.task.attempt + 1
    }
}
