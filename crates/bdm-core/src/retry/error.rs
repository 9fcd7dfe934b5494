//! Attempt outcome and transfer error types.

use std::io;
use thiserror::Error;

use crate::storage::StorageError;

/// What the engine observed when one transfer finished.
#[derive(Debug)]
pub struct AttemptOutcome {
    /// HTTP status of the final response; 0 when none was received.
    pub status: u32,
    /// Error reported by curl for the transfer, if any.
    pub transport: Option<curl::Error>,
    /// Write failure on the staging file, if any (curl then reports a write error too).
    pub storage: Option<io::Error>,
    /// Body bytes appended to the staging file by this attempt.
    pub bytes_written: u64,
    /// Server ignored the range request and the staging file was rewritten from 0.
    pub restarted: bool,
}

impl AttemptOutcome {
    /// Response status, if a response was received.
    pub fn status(&self) -> Option<u32> {
        (self.status != 0).then_some(self.status)
    }
}

/// Why an attempt failed.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Connect, DNS, timeout or other curl-level failure.
    #[error("transport error: {0}")]
    Transport(#[source] curl::Error),
    /// Response status outside 2xx (and not an already-complete 416).
    #[error("HTTP {0}")]
    Protocol(u32),
    /// Writing the staging file failed. Not retried.
    #[error("staging write failed: {0}")]
    Filesystem(#[source] io::Error),
    /// Staging file could not be reopened for the next attempt. Not retried.
    #[error(transparent)]
    Reopen(#[from] StorageError),
}

impl TransferError {
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            TransferError::Filesystem(_) | TransferError::Reopen(_)
        )
    }
}
