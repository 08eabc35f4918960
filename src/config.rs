use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("power ceiling must be finite and positive, got {0}")]
    PowerCeiling(f64),

    #[error("max forward airspeed must be finite and positive, got {0}")]
    MaxForwardAirspeed(f64),

    #[error("num_data_points must be at least 2, got {0}")]
    NumDataPoints(u32),
}

// ---------------------------------------------------------------------------
// Motor limits
// ---------------------------------------------------------------------------

/// The motor constants every thrust query is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorLimits {
    /// Maximum shaft power the motor delivers (hp).
    pub power_ceiling: f64,
    /// Airspeed at which the linear decay model reaches zero thrust (mph).
    pub max_forward_airspeed: f64,
}

impl MotorLimits {
    pub const DEFAULT_POWER_CEILING: f64 = 1.0;
    pub const DEFAULT_MAX_FORWARD_AIRSPEED: f64 = 100.0;

    pub fn new(power_ceiling: f64, max_forward_airspeed: f64) -> Result<Self, ConfigError> {
        let limits = MotorLimits {
            power_ceiling,
            max_forward_airspeed,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.power_ceiling.is_finite() && self.power_ceiling > 0.0) {
            return Err(ConfigError::PowerCeiling(self.power_ceiling));
        }
        if !(self.max_forward_airspeed.is_finite() && self.max_forward_airspeed > 0.0) {
            return Err(ConfigError::MaxForwardAirspeed(self.max_forward_airspeed));
        }
        Ok(())
    }
}

impl Default for MotorLimits {
    fn default() -> Self {
        MotorLimits {
            power_ceiling: Self::DEFAULT_POWER_CEILING,
            max_forward_airspeed: Self::DEFAULT_MAX_FORWARD_AIRSPEED,
        }
    }
}

// ---------------------------------------------------------------------------
// Sweep settings
// ---------------------------------------------------------------------------

/// How far the dynamic-thrust sweep runs for each propeller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Final velocity (mph) of a complete sweep.
    pub num_data_points: u32,
    /// Velocity steps tried against one RPM pair before moving on.
    pub max_steps_per_pair: u32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        SweepSettings {
            num_data_points: 85,
            max_steps_per_pair: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Everything one run of the command-line tool needs.
///
/// Read from JSON; any missing key falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder of propeller data files, walked recursively.
    pub data_dir: PathBuf,
    /// Folder the CSV output is written to.
    pub output_dir: PathBuf,
    /// Output file name without extension.
    pub output_stem: String,
    pub limits: MotorLimits,
    pub sweep: SweepSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("propellerData"),
            output_dir: PathBuf::from("output"),
            output_stem: "UsefulPropellerData".to_string(),
            limits: MotorLimits::default(),
            sweep: SweepSettings::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        if self.sweep.num_data_points < 2 {
            return Err(ConfigError::NumDataPoints(self.sweep.num_data_points));
        }
        Ok(())
    }
}
