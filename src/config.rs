//! Uploader configuration file support.
//!
//! This module provides utilities for reading uploader settings from TOML
//! configuration files. Every field carries a survey default, so an empty
//! file (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::ObjectiveWeights;
use crate::simulation::{DEFAULT_TIME_BUDGET_SEC, MAX_REQTIME_NORMAL_HOURS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no uploader.toml found in standard locations")]
    NotFound,
}

/// Uploader configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_time_budget_sec")]
    pub time_budget_sec: u64,
    #[serde(default = "default_weights")]
    pub weights: [f64; 3],
    #[serde(default = "default_max_request_hours")]
    pub max_request_hours: f64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_time_budget_sec() -> u64 {
    DEFAULT_TIME_BUDGET_SEC
}

fn default_weights() -> [f64; 3] {
    let w = ObjectiveWeights::default();
    [w.pointing_count, w.priority_fairness, w.target_fairness]
}

fn default_max_request_hours() -> f64 {
    MAX_REQTIME_NORMAL_HOURS
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            time_budget_sec: default_time_budget_sec(),
            weights: default_weights(),
            max_request_hours: default_max_request_hours(),
        }
    }
}

impl UploaderConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: UploaderConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `uploader.toml` in the current directory, then the
    /// parent directory.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = vec![
            PathBuf::from("uploader.toml"),
            PathBuf::from("../uploader.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Optimizer objective weights from the configured triple.
    pub fn weights(&self) -> ObjectiveWeights {
        ObjectiveWeights {
            pointing_count: self.simulation.weights[0],
            priority_fairness: self.simulation.weights[1],
            target_fairness: self.simulation.weights[2],
        }
    }

    /// Optimizer wall-time budget.
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.simulation.time_budget_sec)
    }
}
