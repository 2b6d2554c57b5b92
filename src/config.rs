//! World generation parameters
//!
//! Tunables for mesh construction and water classification, with sensible
//! defaults. Loadable from a JSON file for experimentation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters controlling mesh construction and water classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of one graph sector in world units (default: 64)
    pub sector_size: u32,

    /// Mesh resolution: polygon cells per sector axis (default: 16)
    pub cells_per_sector: usize,

    /// Corner jitter as a fraction of the cell step (0.0 = square lattice,
    /// 0.5 = corners may wander half a cell; default: 0.35)
    pub corner_jitter: f32,

    /// Island noise frequency in cycles per sector (default: 1.6)
    /// Lower values produce larger continents, higher values more islands.
    pub island_frequency: f64,

    /// Noise threshold separating water from land (default: 0.1)
    /// Corners whose island noise falls below this value become water.
    /// Raising it drowns more of the world.
    pub water_threshold: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sector_size: 64,
            cells_per_sector: 16,
            corner_jitter: 0.35,
            island_frequency: 1.6,
            water_threshold: 0.1,
        }
    }
}

impl WorldConfig {
    /// Load a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: WorldConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters describe a buildable world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sector_size == 0 {
            return Err(ConfigError::Invalid("sector_size must be positive".into()));
        }
        if self.cells_per_sector == 0 {
            return Err(ConfigError::Invalid(
                "cells_per_sector must be positive".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.corner_jitter) {
            return Err(ConfigError::Invalid(
                "corner_jitter must be in 0.0..=0.5".into(),
            ));
        }
        if self.island_frequency <= 0.0 {
            return Err(ConfigError::Invalid(
                "island_frequency must be positive".into(),
            ));
        }
        Ok(())
    }
}
