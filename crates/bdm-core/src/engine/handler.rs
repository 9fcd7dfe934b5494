//! Easy2 Handler for one transfer in the curl multi engine.
//! Tracks the response status, appends 2xx bodies to the staging file and
//! keeps the latest progress sample for the loop to pick up.

use std::io;
use std::str;

use crate::storage::StagingFile;

/// Parses the status code out of an HTTP status line (`HTTP/1.1 206 Partial Content`).
fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Handler state for one transfer. Owns the task's staging file, so the file
/// is closed exactly when the Easy2 handle is dropped.
pub struct TransferHandler {
    pub(super) file: StagingFile,
    pub(super) resume_offset: u64,
    /// Status of the response currently being received (reset on every status line).
    pub(super) status: Option<u32>,
    /// None = body of the current response not seen yet.
    pub(super) body_accepted: Option<bool>,
    pub(super) restarted: bool,
    pub(super) storage_error: Option<io::Error>,
    sample: Option<(f64, f64)>,
}

impl TransferHandler {
    pub(super) fn new(file: StagingFile, resume_offset: u64) -> Self {
        Self {
            file,
            resume_offset,
            status: None,
            body_accepted: None,
            restarted: false,
            storage_error: None,
            sample: None,
        }
    }

    /// Latest (expected, received) byte counts since the previous call.
    pub(super) fn take_sample(&mut self) -> Option<(f64, f64)> {
        self.sample.take()
    }

    fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }

    /// First body chunk of a response: decide whether it goes to disk.
    fn accept_body(&mut self) -> io::Result<bool> {
        let ok = self.is_success();
        if ok && self.status == Some(200) && self.resume_offset > 0 && !self.restarted {
            tracing::warn!(
                "{}: server ignored range from byte {}, restarting from 0",
                self.file.path().display(),
                self.resume_offset
            );
            self.file.restart()?;
            self.restarted = true;
        }
        Ok(ok)
    }
}

impl curl::easy::Handler for TransferHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            if let Some(code) = parse_status_line(s.trim_end()) {
                self.status = Some(code);
                self.body_accepted = None;
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        let accepted = match self.body_accepted {
            Some(a) => a,
            None => match self.accept_body() {
                Ok(a) => {
                    self.body_accepted = Some(a);
                    a
                }
                Err(e) => {
                    self.storage_error = Some(e);
                    return Ok(0);
                }
            },
        };
        // error pages (e.g. the body of a 416) never reach the staging file
        if !accepted {
            return Ok(data.len());
        }
        match self.file.append(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                self.storage_error = Some(e);
                Ok(0)
            }
        }
    }

    fn progress(&mut self, dltotal: f64, dlnow: f64, _ultotal: f64, _ulnow: f64) -> bool {
        if self.status.is_none() || self.is_success() {
            self.sample = Some((dltotal, dlnow));
        }
        true
    }
}
