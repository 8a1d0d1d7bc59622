//! Configuration management for errmap
//!
//! Config stored at: ~/.config/errmap/config.json

use errmap_domain::service::DEFAULT_MIN_SEPARATION;
use errmap_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Folder created inside the image folder to hold results
    #[serde(default = "default_results_folder_name")]
    pub results_folder_name: String,

    /// Ledger file name inside the results folder
    #[serde(default = "default_results_file_name")]
    pub results_file_name: String,

    /// Pause between a finished step and the next page, in milliseconds
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,

    /// Calibration points closer than this on both axes are rejected
    #[serde(default = "default_min_point_separation")]
    pub min_point_separation: f64,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
}

fn default_results_folder_name() -> String {
    "Results".to_string()
}

fn default_results_file_name() -> String {
    "Results_File.txt".to_string()
}

fn default_transition_delay_ms() -> u64 {
    2000
}

fn default_min_point_separation() -> f64 {
    DEFAULT_MIN_SEPARATION
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_folder_name: default_results_folder_name(),
            results_file_name: default_results_file_name(),
            transition_delay_ms: default_transition_delay_ms(),
            min_point_separation: default_min_point_separation(),
            output_format: default_output_format(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("errmap");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.results_folder_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("results_folder_name is empty".to_string()).into());
        }
        if self.results_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("results_file_name is empty".to_string()).into());
        }
        if !self.min_point_separation.is_finite() || self.min_point_separation < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "min_point_separation must be >= 0, got {}",
                self.min_point_separation
            ))
            .into());
        }
        Ok(())
    }

    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    /// Results folder for an image folder
    pub fn results_dir(&self, image_folder: &Path) -> PathBuf {
        image_folder.join(&self.results_folder_name)
    }

    /// Ledger path for an image folder
    pub fn results_path(&self, image_folder: &Path) -> PathBuf {
        self.results_dir(image_folder).join(&self.results_file_name)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "errmap Configuration")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        writeln!(f, "Results folder:    {}", self.results_folder_name)?;
        writeln!(f, "Results file:      {}", self.results_file_name)?;
        writeln!(f, "Transition delay:  {} ms", self.transition_delay_ms)?;
        writeln!(f, "Min separation:    {} px", self.min_point_separation)?;
        writeln!(f, "Output format:     {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:       {}", path.display())?;
        }

        Ok(())
    }
}
