//! Retry policy.
//!
//! Decides whether a finished attempt succeeded, and if not, whether a
//! successor attempt is created or the URL is exhausted. Retries are
//! resubmitted immediately, without backoff.

mod classify;
mod error;
mod policy;

pub use classify::{classify, classify_curl_error, classify_http_status, ErrorKind};
pub use error::{AttemptOutcome, TransferError};
pub use policy::{Resolution, RetryPolicy};
