//! Admission into the multi handle: configure an Easy2 per task and keep the
//! in-flight set full.

use anyhow::Result;
use std::collections::{HashMap, VecDeque};

use crate::planner::PreparedTask;
use crate::task::TransferTask;

use super::handler::TransferHandler;
use super::TransferOptions;

/// A task whose transfer is attached to the multi handle.
pub(super) struct InFlight {
    pub(super) handle: curl::multi::Easy2Handle<TransferHandler>,
    pub(super) task: TransferTask,
}

/// Result of trying to start one transfer.
pub(super) enum Started {
    InFlight(InFlight),
    /// curl refused the request options (e.g. a URL it cannot handle).
    Rejected(TransferTask, curl::Error),
}

fn configure(
    easy: &mut curl::easy::Easy2<TransferHandler>,
    task: &TransferTask,
    opts: &TransferOptions,
) -> Result<(), curl::Error> {
    easy.url(&task.url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.total_timeout)?;
    easy.progress(true)?;
    if let Some(range) = task.range() {
        easy.range(&range)?;
    }
    Ok(())
}

/// Wrap `prepared` in an Easy2 handle, configure it and add it to `multi` under `token`.
pub(super) fn start_transfer(
    multi: &curl::multi::Multi,
    prepared: PreparedTask,
    token: usize,
    opts: &TransferOptions,
) -> Result<Started> {
    let PreparedTask { task, file } = prepared;
    let mut easy = curl::easy::Easy2::new(TransferHandler::new(file, task.resume_offset));
    if let Err(e) = configure(&mut easy, &task, opts) {
        // dropping `easy` closes the staging file
        return Ok(Started::Rejected(task, e));
    }
    let mut handle = multi
        .add2(easy)
        .map_err(|e| anyhow::anyhow!("curl multi add: {}", e))?;
    handle
        .set_token(token)
        .map_err(|e| anyhow::anyhow!("curl multi token: {}", e))?;
    tracing::debug!(
        "{} started {} (range: {})",
        task.id(),
        task.url,
        task.range().as_deref().unwrap_or("none")
    );
    Ok(Started::InFlight(InFlight { handle, task }))
}

/// Move tasks from `pending` into `active` until `limit` transfers are in
/// flight or nothing is left. Tasks curl refuses go to `rejected`.
pub(super) fn fill_active(
    multi: &curl::multi::Multi,
    opts: &TransferOptions,
    limit: usize,
    next_token: &mut usize,
    pending: &mut VecDeque<PreparedTask>,
    active: &mut HashMap<usize, InFlight>,
    rejected: &mut Vec<(TransferTask, curl::Error)>,
) -> Result<()> {
    while active.len() < limit {
        let Some(prepared) = pending.pop_front() else {
            break;
        };
        let token = *next_token;
        *next_token += 1;
        match start_transfer(multi, prepared, token, opts)? {
            Started::InFlight(flight) => {
                active.insert(token, flight);
            }
            Started::Rejected(task, e) => rejected.push((task, e)),
        }
    }
    Ok(())
}
