//! Labels for failed attempts, used in logs and the report.

use std::fmt;

use super::error::TransferError;

/// Coarse kind of a failed attempt. Every kind except `Storage` is retried
/// alike; the label only says what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect or total).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection refused/reset, DNS, ...).
    Connection,
    /// Server error (5xx other than 503).
    Http5xx(u16),
    /// Writing the staging file failed.
    Storage,
    /// Anything else (4xx, TLS, ...).
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Throttled => write!(f, "throttled"),
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Http5xx(code) => write!(f, "http {}", code),
            ErrorKind::Storage => write!(f, "storage"),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Classify an HTTP status code.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a transfer error.
pub fn classify(e: &TransferError) -> ErrorKind {
    match e {
        TransferError::Transport(ce) => classify_curl_error(ce),
        TransferError::Protocol(code) => classify_http_status(*code),
        TransferError::Filesystem(_) | TransferError::Reopen(_) => ErrorKind::Storage,
    }
}
