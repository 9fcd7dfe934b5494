//! Throttled progress notifications for in-flight tasks.
//!
//! The engine samples each transfer's byte counters after every poll step and
//! feeds them here; the reporter decides which samples are worth an event.
//! State is kept per task id and dropped when the task leaves flight.

use std::collections::HashMap;

use crate::task::TaskId;

/// Notification for one in-flight task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// First progress seen on a task that continues a partial file.
    Resuming { id: TaskId, offset: u64 },
    /// Percent of the current response body received.
    Progress { id: TaskId, percent: u32 },
}

impl ProgressEvent {
    pub fn id(&self) -> TaskId {
        match self {
            ProgressEvent::Resuming { id, .. } | ProgressEvent::Progress { id, .. } => *id,
        }
    }
}

#[derive(Debug, Default)]
struct TaskProgress {
    resuming_sent: bool,
    last_percent: u32,
}

/// Rounded percent of `transferred` over `expected`, capped at 100.
/// None when the expected size is not known yet.
pub fn percent(expected: f64, transferred: f64) -> Option<u32> {
    if expected <= 0.0 || !expected.is_finite() || !transferred.is_finite() {
        return None;
    }
    let p = (transferred.max(0.0) / expected * 100.0).round();
    Some(p.min(100.0) as u32)
}

/// Per-task throttling of progress notifications.
#[derive(Debug)]
pub struct ProgressReporter {
    threshold: u32,
    tasks: HashMap<TaskId, TaskProgress>,
}

impl ProgressReporter {
    /// `threshold_percent` below 1 is treated as 1.
    pub fn new(threshold_percent: u32) -> Self {
        Self {
            threshold: threshold_percent.max(1),
            tasks: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Feeds one progress sample for `id` and returns the events it triggers (at most two).
    pub fn observe(
        &mut self,
        id: TaskId,
        resume_offset: u64,
        expected: f64,
        transferred: f64,
    ) -> Vec<ProgressEvent> {
        let state = self.tasks.entry(id).or_default();
        let mut events = Vec::new();

        if resume_offset > 0 && !state.resuming_sent {
            state.resuming_sent = true;
            events.push(ProgressEvent::Resuming {
                id,
                offset: resume_offset,
            });
        }

        if let Some(p) = percent(expected, transferred) {
            if p >= state.last_percent + self.threshold {
                state.last_percent = p;
                events.push(ProgressEvent::Progress { id, percent: p });
            }
        }
        events
    }

    /// Drops the state of a task that is no longer in flight.
    pub fn forget(&mut self, id: TaskId) {
        self.tasks.remove(&id);
    }

    /// Number of tasks with tracked state.
    pub fn tracked(&self) -> usize {
        self.tasks.len()
    }
}
