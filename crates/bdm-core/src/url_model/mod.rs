//! URL validation and filename derivation.
//!
//! The local name of a download is a pure function of its URL so that a
//! partial file left by one run is found again by the next. Names come from
//! the last path segment, sanitized for Linux; when the path exists but does
//! not end in a usable segment, a digest of the URL is used instead.

mod path;
mod sanitize;

use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

pub use path::{path_tail, PathTail};
pub use sanitize::sanitize_file_name;

/// Prefix of names derived from the URL digest.
const FALLBACK_PREFIX: &str = "download-";

/// Why a URL was rejected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidUrlError {
    #[error("cannot parse URL {url:?}: {reason}")]
    Unparseable { url: String, reason: String },
    #[error("unsupported scheme {scheme:?} in {url}")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("URL has no path component: {0}")]
    MissingPath(String),
}

/// Parses `raw` and checks that it is an HTTP(S) URL.
pub fn parse_download_url(raw: &str) -> Result<Url, InvalidUrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| InvalidUrlError::Unparseable {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(InvalidUrlError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: other.to_string(),
        }),
    }
}

/// Derives the local file name for `raw`.
///
/// # Examples
///
/// - `file_name_for_url("https://example.com/a/report.pdf")` → `"report.pdf"`
/// - `file_name_for_url("https://example.com/pub/")` → `"download-<16 hex>"`
/// - `file_name_for_url("https://example.com")` → `Err(MissingPath)`
pub fn file_name_for_url(raw: &str) -> Result<String, InvalidUrlError> {
    let url = parse_download_url(raw)?;
    let name = match path_tail(&url) {
        PathTail::Missing => return Err(InvalidUrlError::MissingPath(raw.to_string())),
        PathTail::Directory => None,
        PathTail::File(segment) => sanitize_file_name(segment),
    };
    Ok(name.unwrap_or_else(|| fallback_file_name(url.as_str())))
}

/// `download-` followed by the first 16 hex chars of SHA-256 of the URL.
pub fn fallback_file_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex = hex::encode(digest);
    format!("{}{}", FALLBACK_PREFIX, &hex[..16])
}
