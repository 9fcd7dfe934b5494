//! `bdm fetch <url>...` – download one batch and print the report.

use anyhow::Result;
use bdm_core::config::BdmConfig;
use bdm_core::{BatchDirs, BatchReport, DownloadBatch, Outcome, ProgressEvent};
use clap::Args;
use std::path::PathBuf;

/// Default destination directory, relative to the working directory.
const DEFAULT_DEST_DIR: &str = "downloads";
/// Default staging directory, inside the destination directory.
const DEFAULT_STAGING_SUBDIR: &str = ".staging";

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Direct HTTP/HTTPS URLs to download.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Directory for partial downloads (default: <dest-dir>/.staging).
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Directory for completed downloads (default: ./downloads).
    #[arg(long, value_name = "DIR")]
    pub dest_dir: Option<PathBuf>,

    /// Retries per URL after the first attempt.
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Connect timeout per attempt, in seconds.
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Total time limit per attempt, in seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub total_timeout: Option<u64>,

    /// Print progress every time a download advances by this many percent.
    #[arg(long, value_name = "PCT")]
    pub progress_threshold: Option<u32>,

    /// Run at most N transfers at once (default: all).
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Print the report as JSON instead of a table (suppresses progress lines).
    #[arg(long)]
    pub json: bool,
}

impl FetchArgs {
    /// Config with command-line overrides applied.
    pub fn merged_config(&self, cfg: &BdmConfig) -> BdmConfig {
        let mut cfg = cfg.clone();
        if let Some(n) = self.max_retries {
            cfg.max_retries = n;
        }
        if let Some(s) = self.connect_timeout {
            cfg.connect_timeout_secs = s;
        }
        if let Some(s) = self.total_timeout {
            cfg.total_timeout_secs = s;
        }
        if let Some(p) = self.progress_threshold {
            cfg.progress_threshold_percent = p;
        }
        if self.max_concurrent.is_some() {
            cfg.max_concurrent = self.max_concurrent;
        }
        if self.staging_dir.is_some() {
            cfg.staging_dir = self.staging_dir.clone();
        }
        if self.dest_dir.is_some() {
            cfg.destination_dir = self.dest_dir.clone();
        }
        cfg
    }
}

/// Directories for a run: explicit values, else `./downloads` and `<dest>/.staging`.
pub fn batch_dirs(cfg: &BdmConfig) -> BatchDirs {
    let destination = cfg
        .destination_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEST_DIR));
    let staging = cfg
        .staging_dir
        .clone()
        .unwrap_or_else(|| destination.join(DEFAULT_STAGING_SUBDIR));
    BatchDirs {
        staging,
        destination,
    }
}

pub fn run_fetch(cfg: &BdmConfig, args: &FetchArgs) -> Result<()> {
    let cfg = args.merged_config(cfg);
    let dirs = batch_dirs(&cfg);
    let urls = &args.urls;
    let json = args.json;

    let report = DownloadBatch::new(urls.iter().cloned()).run(&cfg, &dirs, |event| {
        if !json {
            print_event(urls, event);
        }
    })?;

    if json {
        println!("{}", report.to_json_pretty()?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_event(urls: &[String], event: &ProgressEvent) {
    let url = urls.get(event.id().index).map(String::as_str).unwrap_or("?");
    match event {
        ProgressEvent::Resuming { id, offset } => {
            println!("  [{}] resuming {} from byte {}", id.index, url, offset)
        }
        ProgressEvent::Progress { id, percent } => {
            println!("  [{}] {:>3}%  {}", id.index, percent, url)
        }
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Completed => "completed".to_string(),
        Outcome::Discarded { .. } => "discarded".to_string(),
        Outcome::Exhausted {
            error,
            staging_deleted,
        } => format!(
            "exhausted: {}{}",
            error,
            if *staging_deleted { " (partial deleted)" } else { "" }
        ),
        Outcome::InvalidUrl { reason } => format!("invalid url: {}", reason),
        Outcome::Filesystem { reason } => format!("filesystem: {}", reason),
        Outcome::Skipped { reason } => format!("skipped: {}", reason),
    }
}

fn print_report(report: &BatchReport) {
    println!(
        "{:<6} {:<7} {:<8} {:<9} {}",
        "INDEX", "STATUS", "ATTEMPTS", "RESUMED", "RESULT"
    );
    for e in &report.entries {
        let status = e
            .status_code
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let result = match &e.final_path {
            Some(p) => p.display().to_string(),
            None => describe(&e.outcome),
        };
        println!(
            "{:<6} {:<7} {:<8} {:<9} {}",
            e.index,
            status,
            e.attempts,
            if e.resumed { "yes" } else { "no" },
            result
        );
    }
    println!(
        "{} of {} download(s) completed",
        report.completed(),
        report.entries.len()
    );
}
