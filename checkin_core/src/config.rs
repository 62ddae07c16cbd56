//! Configuration file support for checkin.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/checkin/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Scan store location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Scan mode parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Repeat scans of the same ID inside this window are skipped
    #[serde(default = "default_duplicate_window_minutes")]
    pub duplicate_window_minutes: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            duplicate_window_minutes: default_duplicate_window_minutes(),
        }
    }
}

impl ScanConfig {
    pub fn duplicate_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.duplicate_window_minutes)
    }
}

/// Export mode parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

// Default value functions
fn default_store_path() -> PathBuf {
    PathBuf::from("scans.csv")
}

fn default_duplicate_window_minutes() -> i64 {
    120
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("checkin").join("config.toml")
    }

    /// Reject settings the scan and export modes cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.scan.duplicate_window_minutes <= 0 {
            return Err(Error::Config(format!(
                "scan.duplicate_window_minutes must be positive, got {}",
                self.scan.duplicate_window_minutes
            )));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(Error::Config("store.path must not be empty".into()));
        }
        Ok(())
    }
}
