//! One invocation of the downloader: validate the URLs, create the
//! directories, run every task through the engine and finalize the results.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::BdmConfig;
use crate::engine::TransferEngine;
use crate::finalize::{FinalizationStage, Outcome, ReportEntry};
use crate::planner::{PlanError, ResumePlanner};
use crate::progress::ProgressEvent;
use crate::storage;

/// Setup failures that abort the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no URL given")]
    Empty,
    #[error("none of the {0} URL(s) could be parsed")]
    NoValidUrls(usize),
}

/// Staging and destination directories of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDirs {
    pub staging: PathBuf,
    pub destination: PathBuf,
}

/// Per-URL outcomes, ordered by submission index.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub entries: Vec<ReportEntry>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|e| e.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.completed()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing report")
    }
}

/// The URL set of one invocation. Nothing of it outlives the run except the
/// files it leaves on disk.
#[derive(Debug, Clone)]
pub struct DownloadBatch {
    urls: Vec<String>,
}

impl DownloadBatch {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Downloads every URL and returns the report.
    ///
    /// Fails only on setup errors: an empty batch, a batch where no URL parses,
    /// or directories that cannot be created. Everything that goes wrong with a
    /// single URL is reported in its entry instead.
    pub fn run<F>(&self, cfg: &BdmConfig, dirs: &BatchDirs, on_event: F) -> Result<BatchReport>
    where
        F: FnMut(&ProgressEvent),
    {
        if self.urls.is_empty() {
            return Err(BatchError::Empty.into());
        }
        let planner = ResumePlanner::new(&dirs.staging);
        let mut entries = Vec::with_capacity(self.urls.len());

        let mut planned: Vec<(usize, &str, PathBuf)> = Vec::new();
        let mut owners: HashMap<PathBuf, usize> = HashMap::new();
        for (index, url) in self.urls.iter().enumerate() {
            match planner.staging_path(url) {
                Ok(path) => {
                    if let Some(&first) = owners.get(&path) {
                        tracing::warn!("#{} {} shares its staging file with #{}", index, url, first);
                        entries.push(ReportEntry::rejected(
                            index,
                            url,
                            Some(path.clone()),
                            Outcome::Skipped {
                                reason: format!("{} is already used by #{}", path.display(), first),
                            },
                        ));
                        continue;
                    }
                    owners.insert(path.clone(), index);
                    planned.push((index, url, path));
                }
                Err(e) => {
                    tracing::warn!("#{} rejected: {}", index, e);
                    entries.push(ReportEntry::rejected(
                        index,
                        url,
                        None,
                        Outcome::InvalidUrl {
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }
        if planned.is_empty() {
            return Err(BatchError::NoValidUrls(self.urls.len()).into());
        }

        storage::ensure_dir(&dirs.staging).context("creating staging directory")?;
        storage::ensure_dir(&dirs.destination).context("creating destination directory")?;

        let mut tasks = Vec::with_capacity(planned.len());
        for (index, url, path) in planned {
            match planner.prepare(index, url) {
                Ok(prepared) => tasks.push(prepared),
                Err(PlanError::InvalidUrl(e)) => entries.push(ReportEntry::rejected(
                    index,
                    url,
                    None,
                    Outcome::InvalidUrl {
                        reason: e.to_string(),
                    },
                )),
                Err(PlanError::Storage(e)) => {
                    let e = anyhow::Error::new(e);
                    tracing::warn!("#{} {:#}", index, e);
                    entries.push(ReportEntry::rejected(
                        index,
                        url,
                        Some(path),
                        Outcome::Filesystem {
                            reason: format!("{:#}", e),
                        },
                    ));
                }
            }
        }

        tracing::info!(
            "batch of {} URL(s): {} task(s) to transfer into {}",
            self.urls.len(),
            tasks.len(),
            dirs.staging.display()
        );
        let results = TransferEngine::from_config(&planner, cfg).run(tasks, on_event)?;

        let stage = FinalizationStage::new(&dirs.destination);
        entries.extend(results.into_iter().map(|r| stage.finalize(r)));
        entries.sort_by_key(|e| e.index);

        let report = BatchReport { entries };
        tracing::info!(
            "batch finished: {} completed, {} failed",
            report.completed(),
            report.failed()
        );
        Ok(report)
    }
}
