use crate::planner::{PreparedTask, ResumePlanner};
use crate::storage::StorageError;
use crate::task::TransferTask;

use super::error::{AttemptOutcome, TransferError};

/// HTTP 416 Range Not Satisfiable: the partial file is already complete.
pub const STATUS_RANGE_NOT_SATISFIABLE: u32 = 416;

/// What happens to a task after one of its attempts finished.
#[derive(Debug)]
pub enum Resolution {
    /// Terminal success with the given status.
    Succeeded { status: u32 },
    /// Attempt failed with budget left; a successor attempt follows.
    Retry(TransferError),
    /// Attempt failed and no successor follows.
    Exhausted(TransferError),
}

/// Bounded retry budget with immediate resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Success or failure of a single attempt, ignoring the retry budget.
    ///
    /// Success is a 2xx without transport error, or a 416 that curl either
    /// accepted or flagged as a range error: the file was already fully
    /// downloaded by an earlier run.
    pub fn evaluate(outcome: AttemptOutcome) -> Result<u32, TransferError> {
        if let Some(io) = outcome.storage {
            return Err(TransferError::Filesystem(io));
        }
        let status = outcome.status;
        match outcome.transport {
            None if (200..300).contains(&status) => Ok(status),
            None if status == STATUS_RANGE_NOT_SATISFIABLE => Ok(status),
            Some(e) if e.is_range_error() && status == STATUS_RANGE_NOT_SATISFIABLE => Ok(status),
            Some(e) => Err(TransferError::Transport(e)),
            None => Err(TransferError::Protocol(status)),
        }
    }

    /// Resolves `task` given the outcome of its attempt.
    pub fn resolve(&self, task: &TransferTask, outcome: AttemptOutcome) -> Resolution {
        match Self::evaluate(outcome) {
            Ok(status) => Resolution::Succeeded { status },
            Err(e) if e.is_retryable() && task.attempt < self.max_retries => Resolution::Retry(e),
            Err(e) => Resolution::Exhausted(e),
        }
    }

    /// Next attempt for `task`: same URL and file, `attempt + 1`, offset re-read from disk.
    pub fn successor(
        &self,
        task: &TransferTask,
        planner: &ResumePlanner,
    ) -> Result<PreparedTask, StorageError> {
        debug_assert!(task.attempt < self.max_retries);
        planner.successor(task)
    }
}
