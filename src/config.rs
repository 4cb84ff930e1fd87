//! Configuration for the tagtrend forecaster.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for forecasting runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Window duration in seconds
    pub window_seconds: i64,

    /// Recent sub-interval override in seconds (defaults to 1% of the
    /// window when absent)
    pub quantum_seconds: Option<i64>,

    /// How many past windows feed each feature vector
    pub history_windows: usize,

    /// Whether window models fit incrementally during prediction
    pub online: bool,

    /// SGD learning rate for the regression models
    pub learning_rate: f64,

    /// Maximum number of models in the ensemble pool
    pub ensemble_size: usize,

    /// Training span length (in windows) for ensemble candidates
    pub train_size: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_seconds: 3600,
            quantum_seconds: None,
            history_windows: 3,
            online: true,
            learning_rate: 0.01,
            ensemble_size: 5,
            train_size: 10,
        }
    }
}

impl ForecastConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: ForecastConfig =
                serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tagtrend")
            .join("config.json")
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
