use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::spectrum::accumulate::TriggerPolicy;
use crate::spectrum::calibrate::CalibrationPoint;
use crate::window::Roi;

// ---------------------------------------------------------------------------
// Options – the persisted acquisition configuration
// ---------------------------------------------------------------------------

/// Accumulation trigger as written to the options file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerConfig {
    Frames(u32),
    TimeMs(u64),
}

impl From<TriggerConfig> for TriggerPolicy {
    fn from(config: TriggerConfig) -> Self {
        match config {
            TriggerConfig::Frames(n) => TriggerPolicy::Frames(n),
            TriggerConfig::TimeMs(ms) => TriggerPolicy::Elapsed(Duration::from_millis(ms)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Region of interest; an all-zero rectangle means "no ROI".
    pub roi: Roi,
    /// Rotation in degrees; 0 means "no rotation".
    pub rotation_deg: f64,
    /// Up to three (pixel column, wavelength) calibration pairs.
    pub calibration: Vec<CalibrationPoint>,
    pub trigger: TriggerConfig,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            roi: Roi::default(),
            rotation_deg: 0.0,
            calibration: Vec::new(),
            trigger: TriggerConfig::TimeMs(1000),
        }
    }
}

impl Options {
    /// Load options from a JSON file. A missing or unreadable file falls back
    /// to defaults; a bad options file never stops acquisition.
    pub fn load(path: &Path) -> Options {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::info!(
                    "options file {} not readable ({err}), using defaults",
                    path.display()
                );
                return Options::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(options) => options,
            Err(err) => {
                log::warn!(
                    "options file {} is malformed ({err}), using defaults",
                    path.display()
                );
                Options::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing options")?;
        fs::write(path, text).with_context(|| format!("writing options file {}", path.display()))
    }
}
