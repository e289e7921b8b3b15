//! Game configuration (YAML).
//!
//! Every section is optional; missing sections fall back to the reference
//! 4x4 board, a 3-card deck and the built-in achievement set.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::achievements::{default_achievements, AchievementDef};
use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS};

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Board dimensions.
    #[serde(default)]
    pub grid: GridConfig,
    /// Resource deck settings.
    #[serde(default)]
    pub deck: DeckConfig,
    /// Achievement catalog evaluated when a game finishes.
    #[serde(default = "default_achievements")]
    pub achievements: Vec<AchievementDef>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            deck: DeckConfig::default(),
            achievements: default_achievements(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
}

fn default_rows() -> usize {
    DEFAULT_ROWS
}

fn default_cols() -> usize {
    DEFAULT_COLS
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeckConfig {
    /// Number of resource cards on offer.
    #[serde(default = "default_deck_size")]
    pub size: usize,
    /// Seed for card redraws.
    #[serde(default)]
    pub seed: u64,
}

fn default_deck_size() -> usize {
    3
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            size: default_deck_size(),
            seed: 0,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1 (got {}x{})",
                self.grid.rows, self.grid.cols
            )));
        }
        if self.deck.size == 0 {
            return Err(ConfigError::Invalid("deck.size must be >= 1".to_string()));
        }
        Ok(())
    }
}
