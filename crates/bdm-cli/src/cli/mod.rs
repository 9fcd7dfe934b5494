//! CLI for the BDM batch downloader.

mod commands;

use anyhow::Result;
use bdm_core::config::{self, BdmConfig};
use clap::{Parser, Subcommand};

pub use commands::FetchArgs;
use commands::{run_completions, run_fetch};

/// Top-level CLI for the BDM batch downloader.
#[derive(Debug, Parser)]
#[command(name = "bdm")]
#[command(about = "BDM: concurrent batch downloader with resume and retry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a batch of URLs, resuming partial files left by earlier runs.
    Fetch(FetchArgs),

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config file values, or defaults when the file is unusable. A broken config
/// never stops a batch.
fn load_config() -> BdmConfig {
    match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("config not loaded, using defaults: {:#}", e);
            eprintln!("bdm: config not loaded ({:#}), using defaults", e);
            BdmConfig::default()
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch(args) => {
                let cfg = load_config();
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(&cfg, &args)?;
            }
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
