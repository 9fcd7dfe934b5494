//! Post-download phase: move accepted files into the destination directory,
//! delete everything else from staging, and describe each URL in the report.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::retry::TransferError;
use crate::storage;
use crate::task::{TaskResult, TaskState};

/// Statuses whose staging file is kept and moved into place.
pub const ACCEPTED_STATUSES: [u32; 3] = [200, 206, 416];

/// How a URL of the batch ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// File moved into the destination directory.
    Completed,
    /// Transfer succeeded with a status we do not keep (e.g. 204); staging file removed.
    Discarded { staging_deleted: bool },
    /// Retry budget used up; staging file removed.
    Exhausted {
        error: String,
        staging_deleted: bool,
    },
    /// Rejected before any network activity.
    InvalidUrl { reason: String },
    /// Staging or destination file could not be written, moved or deleted.
    Filesystem { reason: String },
    /// Another URL of the same batch already uses this staging file.
    Skipped { reason: String },
}

/// One line of the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Position of the URL in the submitted batch.
    pub index: usize,
    pub url: String,
    /// HTTP status of the last attempt.
    pub status_code: Option<u32>,
    pub resumed: bool,
    /// Where the file is now (destination directory), if it was kept.
    pub final_path: Option<PathBuf>,
    /// Staging file used by the task, if one was derived.
    pub staging_path: Option<PathBuf>,
    /// Attempts made (0 for URLs rejected before any transfer).
    pub attempts: u32,
    /// Body bytes written to the staging file by the last attempt.
    pub bytes_received: u64,
    pub outcome: Outcome,
}

impl ReportEntry {
    /// Entry for a URL that never became a task.
    pub fn rejected(index: usize, url: &str, staging_path: Option<PathBuf>, outcome: Outcome) -> Self {
        Self {
            index,
            url: url.to_string(),
            status_code: None,
            resumed: false,
            final_path: None,
            staging_path,
            attempts: 0,
            bytes_received: 0,
            outcome,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

/// Consumes terminal task results.
#[derive(Debug, Clone)]
pub struct FinalizationStage {
    destination_dir: PathBuf,
}

impl FinalizationStage {
    pub fn new(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
        }
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Moves or deletes the staging file of `result` and reports it.
    pub fn finalize(&self, result: TaskResult) -> ReportEntry {
        let attempts = result.attempts();
        let staging = result.task.file_path.clone();
        let mut entry = ReportEntry {
            index: result.task.index,
            url: result.task.url.clone(),
            status_code: result.status,
            resumed: result.resumed,
            final_path: None,
            staging_path: Some(staging.clone()),
            attempts,
            bytes_received: result.bytes_received,
            outcome: Outcome::Completed,
        };

        // exhausted results carry a status only for protocol failures, never an accepted one
        let keep = result
            .status
            .is_some_and(|s| ACCEPTED_STATUSES.contains(&s));
        if result.state == TaskState::Succeeded && keep {
            match storage::move_into(&staging, &self.destination_dir) {
                Ok(path) => {
                    tracing::info!("#{} moved to {}", entry.index, path.display());
                    entry.final_path = Some(path);
                }
                Err(e) => {
                    let e = anyhow::Error::new(e);
                    tracing::warn!("#{} {:#}", entry.index, e);
                    entry.outcome = Outcome::Filesystem {
                        reason: format!("{:#}", e),
                    };
                }
            }
            return entry;
        }

        let staging_deleted = match storage::discard(&staging) {
            Ok(deleted) => deleted,
            Err(e) => {
                let e = anyhow::Error::new(e);
                tracing::warn!("#{} {:#}", entry.index, e);
                entry.outcome = Outcome::Filesystem {
                    reason: format!("{:#}", e),
                };
                return entry;
            }
        };
        tracing::debug!(
            "#{} staging file {} ({} attempt(s))",
            entry.index,
            if staging_deleted { "deleted" } else { "already gone" },
            attempts
        );

        entry.outcome = match result.error {
            Some(e @ (TransferError::Filesystem(_) | TransferError::Reopen(_))) => Outcome::Filesystem {
                reason: format!("{:#}", anyhow::Error::new(e)),
            },
            Some(e) => Outcome::Exhausted {
                error: e.to_string(),
                staging_deleted,
            },
            None => Outcome::Discarded { staging_deleted },
        };
        entry
    }
}
