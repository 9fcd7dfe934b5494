pub mod config;
pub mod logging;

pub mod batch;
pub mod engine;
pub mod finalize;
pub mod planner;
pub mod progress;
pub mod retry;
pub mod storage;
pub mod task;
pub mod url_model;

pub use batch::{BatchDirs, BatchError, BatchReport, DownloadBatch};
pub use finalize::{Outcome, ReportEntry};
pub use progress::ProgressEvent;
