//! CLI command handlers, one per file.

mod completions;
mod fetch;

pub use completions::run_completions;
pub use fetch::{batch_dirs, run_fetch, FetchArgs};
