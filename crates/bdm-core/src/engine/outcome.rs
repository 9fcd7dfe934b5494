//! Build AttemptOutcome from a completed Easy2 transfer (curl result + handler state).

use crate::retry::AttemptOutcome;

use super::handler::TransferHandler;

/// Collects status, transport error and handler state of a finished transfer.
pub(super) fn attempt_outcome(
    easy: &mut curl::easy::Easy2<TransferHandler>,
    transfer: Result<(), curl::Error>,
) -> AttemptOutcome {
    let status = easy.response_code().unwrap_or(0);
    let handler = easy.get_mut();
    AttemptOutcome {
        status,
        transport: transfer.err(),
        storage: handler.storage_error.take(),
        bytes_written: handler.file.bytes_written(),
        restarted: handler.restarted,
    }
}
