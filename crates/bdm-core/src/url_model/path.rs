//! Basename extraction from a parsed URL path.

use url::Url;

/// Shape of the last component of a URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTail<'a> {
    /// Path is empty or `/`: nothing to name the file after.
    Missing,
    /// Path has segments but ends with `/` (e.g. `/dir/`).
    Directory,
    /// Last non-empty segment, still percent-encoded.
    File(&'a str),
}

/// Classifies the last component of `url`'s path. Query and fragment are ignored.
pub fn path_tail(url: &Url) -> PathTail<'_> {
    let path = url.path();
    if path.split('/').all(|s| s.is_empty()) {
        return PathTail::Missing;
    }
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => PathTail::File(last),
        _ => PathTail::Directory,
    }
}
