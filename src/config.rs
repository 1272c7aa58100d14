use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::boundary::BoundaryPolicy;
use crate::error::IngestError;

// ---------------------------------------------------------------------------
// Calibration – conversion constants threaded into the builder and layout
// ---------------------------------------------------------------------------

/// Accelerometer sensitivity of the shaker setup, in mV per g.
pub const DEFAULT_SENSITIVITY_MV_PER_G: f64 = 250.0;

/// Width of one frequency bin, in Hz.
pub const DEFAULT_BIN_WIDTH_HZ: f64 = 1.0;

/// Constants that turn raw readings into canonical region values.
///
/// Kept as a value rather than process-wide state so datasets built with
/// different constants can coexist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub sensitivity_mv_per_g: f64,
    pub df: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            sensitivity_mv_per_g: DEFAULT_SENSITIVITY_MV_PER_G,
            df: DEFAULT_BIN_WIDTH_HZ,
        }
    }
}

impl Calibration {
    /// Reject constants that would make the conversion meaningless.
    pub fn validate(&self) -> Result<(), IngestError> {
        check_positive("sensitivity_mv_per_g", self.sensitivity_mv_per_g)?;
        check_positive("df", self.df)?;
        Ok(())
    }

    /// Human-readable conversion formula stored in dataset metadata.
    pub fn formula(&self) -> String {
        format!("Gamma = V_mV / {}", self.sensitivity_mv_per_g)
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<(), IngestError> {
    if !value.is_finite() {
        return Err(IngestError::InvalidCalibration {
            parameter,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(IngestError::InvalidCalibration {
            parameter,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Layout – canvas size and tick spacing for the phase diagram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 50.0,
            left: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub frequency_tick_step: f64,
    pub gamma_tick_step: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            margins: Margins::default(),
            frequency_tick_step: 1.0,
            gamma_tick_step: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Paths – where tables, dataset documents and pattern images live
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pattern_dir: PathBuf,
    pub png_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/datasets"),
            pattern_dir: PathBuf::from("public/patterns"),
            png_dir: PathBuf::from("public/patterns_png"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config – everything together
// ---------------------------------------------------------------------------

/// Full configuration, loadable from a JSON file where every section and
/// field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calibration: Calibration,
    pub layout: LayoutConfig,
    pub boundary: BoundaryPolicy,
    pub paths: Paths,
}

impl Config {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(IngestError::MissingSource {
                        path: path.to_path_buf(),
                    }
                    .into());
                }
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let config: Config = serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                log::info!("loaded config from {}", path.display());
                config
            }
            None => Config::default(),
        };
        config.calibration.validate()?;
        Ok(config)
    }
}
