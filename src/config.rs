//! Caller-supplied engine configuration
//!
//! Serialized as JSON. Every key is optional; missing keys take the defaults
//! from [`crate::constants`].

use crate::constants::{columns, ingest, interaction, resample};
use crate::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the resampler's minimum resolution is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Re-derived from the visible range and sample rate after each viewport change
    #[default]
    Adaptive,
    /// Held at a fixed value
    Fixed { min_resolution: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chunk_rows: usize,
    pub target_onscreen_points: usize,
    pub timestamp_column: String,
    pub message_column: String,
    pub delimiter: char,
    pub resolution: ResolutionPolicy,
    /// Minimum resolution in effect before the first viewport change
    pub initial_min_resolution: f64,
    pub debounce_ms: u64,
    /// Fixed lower bound of the value axis
    pub y_min: Option<f64>,
    /// Fixed upper bound of the value axis
    pub y_max: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_rows: ingest::DEFAULT_CHUNK_ROWS,
            target_onscreen_points: resample::DEFAULT_TARGET_ONSCREEN_POINTS,
            timestamp_column: columns::DEFAULT_TIMESTAMP_COLUMN.to_string(),
            message_column: columns::DEFAULT_MESSAGE_COLUMN.to_string(),
            delimiter: ingest::DEFAULT_DELIMITER,
            resolution: ResolutionPolicy::default(),
            initial_min_resolution: resample::DEFAULT_MIN_RESOLUTION,
            debounce_ms: interaction::DEFAULT_DEBOUNCE_MS,
            y_min: None,
            y_max: None,
        }
    }
}

impl Config {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing or invalid file yields the defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_rows == 0 {
            return Err(TelemetryError::Config("chunk_rows must be at least 1".into()));
        }
        if self.target_onscreen_points == 0 {
            return Err(TelemetryError::Config(
                "target_onscreen_points must be at least 1".into(),
            ));
        }
        if self.timestamp_column.trim().is_empty() {
            return Err(TelemetryError::Config("timestamp_column is empty".into()));
        }
        if self.timestamp_column == self.message_column {
            return Err(TelemetryError::Config(
                "timestamp_column and message_column must differ".into(),
            ));
        }
        if let ResolutionPolicy::Fixed { min_resolution } = self.resolution {
            if !(min_resolution.is_finite() && min_resolution >= 1.0) {
                return Err(TelemetryError::Config(format!(
                    "fixed min_resolution must be >= 1, got {}",
                    min_resolution
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (self.y_min, self.y_max) {
            if lo > hi {
                return Err(TelemetryError::Config(format!(
                    "y_min ({}) is above y_max ({})",
                    lo, hi
                )));
            }
        }
        Ok(())
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}
