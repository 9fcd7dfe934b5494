//! Curl multi engine: one single-threaded event loop drives every transfer of
//! a batch, one Easy2 handle per task.
//!
//! Each loop iteration advances all transfers without blocking, waits (at
//! most 100 ms) for socket readiness, then drains finished transfers. A
//! finished transfer's handle and staging file are released before the retry
//! policy looks at it, so a successor attempt reopens the file on its own.

mod admit;
mod handler;
mod outcome;
mod run;

use std::time::Duration;

use crate::config::BdmConfig;
use crate::planner::ResumePlanner;
use crate::progress::ProgressReporter;
use crate::retry::RetryPolicy;

/// Per-attempt curl settings and the optional admission cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    /// At most this many transfers in flight; None = all tasks at once.
    pub max_concurrent: Option<usize>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self::from_config(&BdmConfig::default())
    }
}

impl TransferOptions {
    pub fn from_config(cfg: &BdmConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            total_timeout: cfg.total_timeout(),
            max_concurrent: cfg.max_concurrent,
        }
    }
}

/// Multiplexes all transfers of a batch until every task is terminal.
///
/// The task registry, the retry queue and the progress state are owned by the
/// engine and only touched from the loop, so nothing here is shared or locked.
pub struct TransferEngine<'a> {
    planner: &'a ResumePlanner,
    policy: RetryPolicy,
    options: TransferOptions,
    reporter: ProgressReporter,
}

impl<'a> TransferEngine<'a> {
    pub fn new(
        planner: &'a ResumePlanner,
        policy: RetryPolicy,
        options: TransferOptions,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            planner,
            policy,
            options,
            reporter,
        }
    }

    pub fn from_config(planner: &'a ResumePlanner, cfg: &BdmConfig) -> Self {
        Self::new(
            planner,
            RetryPolicy::new(cfg.max_retries),
            TransferOptions::from_config(cfg),
            ProgressReporter::new(cfg.progress_threshold_percent),
        )
    }
}
