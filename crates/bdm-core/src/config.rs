use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/bdm/config.toml`.
///
/// Every field has a default so a partial file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BdmConfig {
    /// Retries after the first attempt (so `max_retries + 1` attempts in total).
    pub max_retries: u32,
    /// Connect timeout for a single attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Wall-clock limit for a single attempt, in seconds.
    pub total_timeout_secs: u64,
    /// Minimum percent increase between two progress notifications of one task.
    pub progress_threshold_percent: u32,
    /// Optional ceiling on simultaneous transfers (None = every task at once).
    pub max_concurrent: Option<usize>,
    /// Directory for partial downloads. None = CLI default.
    pub staging_dir: Option<PathBuf>,
    /// Directory for completed downloads. None = CLI default.
    pub destination_dir: Option<PathBuf>,
}

impl Default for BdmConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            connect_timeout_secs: 10,
            total_timeout_secs: 60,
            progress_threshold_percent: 5,
            max_concurrent: None,
            staging_dir: None,
            destination_dir: None,
        }
    }
}

impl BdmConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BdmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
