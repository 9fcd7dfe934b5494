//! Curl multi event loop: perform, sample progress, wait, drain messages;
//! settle finished transfers and resubmit retries.

use anyhow::Result;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::planner::PreparedTask;
use crate::progress::ProgressEvent;
use crate::retry::{classify, AttemptOutcome, Resolution, TransferError};
use crate::task::{TaskResult, TaskState, TransferTask};

use super::admit::{self, InFlight};
use super::outcome;
use super::TransferEngine;

/// Upper bound of the readiness wait per iteration.
const WAIT: Duration = Duration::from_millis(100);

impl TransferEngine<'_> {
    /// Runs `tasks` to completion and returns one terminal result per task,
    /// in completion order. Progress events go to `on_event` as they happen.
    ///
    /// Only failures of the multi handle itself are returned as errors; every
    /// per-task failure ends up in the results.
    pub fn run<F>(&mut self, tasks: Vec<PreparedTask>, mut on_event: F) -> Result<Vec<TaskResult>>
    where
        F: FnMut(&ProgressEvent),
    {
        let multi = curl::multi::Multi::new();
        let limit = self.options.max_concurrent.unwrap_or(usize::MAX).max(1);
        let mut pending: VecDeque<PreparedTask> = tasks.into_iter().collect();
        let mut active: HashMap<usize, InFlight> = HashMap::new();
        let mut results: Vec<TaskResult> = Vec::with_capacity(pending.len());
        let mut next_token = 0usize;

        self.admit(&multi, limit, &mut next_token, &mut pending, &mut active, &mut results)?;

        while !active.is_empty() || !pending.is_empty() {
            let running = multi
                .perform()
                .map_err(|e| anyhow::anyhow!("curl multi perform: {}", e))?
                as usize;
            self.sample_progress(&mut active, &mut on_event);

            // finished transfers are already queued: drain without waiting
            if running > 0 && running == active.len() {
                multi
                    .wait(&mut [], WAIT)
                    .map_err(|e| anyhow::anyhow!("curl multi wait: {}", e))?;
            }

            let mut finished: Vec<(usize, Result<(), curl::Error>)> = Vec::new();
            multi.messages(|msg| {
                if let (Ok(token), Some(result)) = (msg.token(), msg.result()) {
                    finished.push((token, result));
                }
            });

            for (token, transfer) in finished {
                let Some(flight) = active.remove(&token) else {
                    continue;
                };
                let mut easy = multi
                    .remove2(flight.handle)
                    .map_err(|e| anyhow::anyhow!("curl multi remove: {}", e))?;
                let attempt = outcome::attempt_outcome(&mut easy, transfer);
                // closes the staging file before any successor reopens it
                drop(easy);
                self.settle(flight.task, attempt, &mut pending, &mut results);
            }

            self.admit(&multi, limit, &mut next_token, &mut pending, &mut active, &mut results)?;
        }

        debug_assert_eq!(self.reporter.tracked(), 0);
        Ok(results)
    }

    fn admit(
        &mut self,
        multi: &curl::multi::Multi,
        limit: usize,
        next_token: &mut usize,
        pending: &mut VecDeque<PreparedTask>,
        active: &mut HashMap<usize, InFlight>,
        results: &mut Vec<TaskResult>,
    ) -> Result<()> {
        let mut rejected = Vec::new();
        admit::fill_active(
            multi,
            &self.options,
            limit,
            next_token,
            pending,
            active,
            &mut rejected,
        )?;
        for (task, e) in rejected {
            tracing::warn!("{} {} rejected by curl: {}", task.id(), task.url, e);
            let resumed = task.resumed();
            results.push(exhausted(task, None, TransferError::Transport(e), resumed, 0));
        }
        Ok(())
    }

    fn sample_progress<F>(&mut self, active: &mut HashMap<usize, InFlight>, on_event: &mut F)
    where
        F: FnMut(&ProgressEvent),
    {
        for flight in active.values_mut() {
            let Some((expected, received)) = flight.handle.get_mut().take_sample() else {
                continue;
            };
            let task = &flight.task;
            for event in self
                .reporter
                .observe(task.id(), task.resume_offset, expected, received)
            {
                tracing::debug!("{} progress: {:?}", task.id(), event);
                on_event(&event);
            }
        }
    }

    /// Resolves one finished attempt: terminal result, or a successor queued
    /// at the front of `pending` so it is admitted right away.
    fn settle(
        &mut self,
        task: TransferTask,
        attempt: AttemptOutcome,
        pending: &mut VecDeque<PreparedTask>,
        results: &mut Vec<TaskResult>,
    ) {
        self.reporter.forget(task.id());
        let bytes = attempt.bytes_written;
        let resumed = task.resumed() && !attempt.restarted;

        match self.policy.resolve(&task, attempt) {
            Resolution::Succeeded { status } => {
                tracing::info!(
                    "{} {} done: HTTP {}, {} bytes this attempt",
                    task.id(),
                    task.url,
                    status,
                    bytes
                );
                results.push(TaskResult {
                    task,
                    state: TaskState::Succeeded,
                    status: Some(status),
                    error: None,
                    resumed,
                    bytes_received: bytes,
                });
            }
            Resolution::Retry(e) => {
                tracing::warn!(
                    "{} {} failed ({}: {}), retry {}/{}",
                    task.id(),
                    task.url,
                    classify(&e),
                    e,
                    task.attempt + 1,
                    self.policy.max_retries
                );
                match self.policy.successor(&task, self.planner) {
                    Ok(next) => pending.push_front(next),
                    Err(reopen) => {
                        tracing::warn!("{} cannot retry: {}", task.id(), reopen);
                        let status = failure_status(&e);
                        results.push(exhausted(task, status, reopen.into(), resumed, bytes));
                    }
                }
            }
            Resolution::Exhausted(e) => {
                tracing::warn!(
                    "{} {} exhausted after {} attempt(s) ({}: {})",
                    task.id(),
                    task.url,
                    task.attempt + 1,
                    classify(&e),
                    e
                );
                let status = failure_status(&e);
                results.push(exhausted(task, status, e, resumed, bytes));
            }
        }
    }
}

/// Status reported for a failed attempt: the response code only when it is
/// the reason for the failure. A 200 cut short by a timeout reports none.
fn failure_status(error: &TransferError) -> Option<u32> {
    match error {
        TransferError::Protocol(code) => Some(*code),
        _ => None,
    }
}

fn exhausted(
    task: TransferTask,
    status: Option<u32>,
    error: TransferError,
    resumed: bool,
    bytes: u64,
) -> TaskResult {
    TaskResult {
        task,
        state: TaskState::Exhausted,
        status,
        error: Some(error),
        resumed,
        bytes_received: bytes,
    }
}
