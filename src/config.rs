//! Configuration for gait-cycle analysis.
//!
//! ## Loading from TOML
//!
//! Every section has sensible defaults, so a configuration file only needs
//! the values that differ:
//!
//! ```toml
//! leg = "right"
//! gait_cycles = 3
//!
//! [filter]
//! cutoff_hz = 6.0
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{
    NORMALIZED_CYCLE_POINTS, OVERGROUND_SPEED_THRESHOLD, STANCE_END_FRACTION,
    STANCE_START_FRACTION,
};
use crate::error::{GaitError, Result};

/// Which leg to use as the ipsilateral (reference) leg
///
/// # Parsing formats
/// - `auto` - pick the leg whose last heel-strike is most recent
/// - `left` or `l`
/// - `right` or `r`
///
/// # Example
/// ```
/// use gaitcycle::config::LegSelection;
///
/// let leg: LegSelection = "r".parse().unwrap();
/// assert_eq!(leg, LegSelection::Right);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LegSelection {
    /// Choose the leg with the latest heel-strike
    #[default]
    Auto,
    /// Left leg is ipsilateral
    Left,
    /// Right leg is ipsilateral
    Right,
}

impl fmt::Display for LegSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

impl FromStr for LegSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            other => Err(format!("invalid leg: {}", other)),
        }
    }
}

/// Top-level analysis configuration
///
/// Use `AnalysisConfig::default()` for the reference behaviour: automatic
/// leg selection, one gait cycle and no marker filtering.
///
/// # Example
/// ```
/// use gaitcycle::config::{AnalysisConfig, LegSelection};
///
/// let mut config = AnalysisConfig::default();
/// config.leg = LegSelection::Left;
/// config.gait_cycles = 4;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ipsilateral leg selection
    pub leg: LegSelection,
    /// Requested number of gait cycles (most recent first)
    pub gait_cycles: usize,
    /// Marker and coordinate low-pass filtering
    pub filter: FilterConfig,
    /// Event detection configuration
    pub events: EventConfig,
    /// Treadmill speed estimation configuration
    pub treadmill: TreadmillConfig,
    /// Time normalisation configuration
    pub normalization: NormalizationConfig,
}

/// Low-pass filter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Cutoff frequency in Hz; zero or negative disables filtering
    pub cutoff_hz: f64,
    /// Butterworth order of each (forward and backward) pass
    pub order: usize,
}

/// Gait event detection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// World axis (0 = x, 1 = y, 2 = z) along which feet are compared to the pelvis
    pub heading_axis: usize,
}

/// Treadmill speed estimation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TreadmillConfig {
    /// Estimates below this speed are clamped to zero (overground)
    pub overground_threshold: f64,
    /// Fraction of stance skipped after heel-strike (loading response)
    pub stance_start_fraction: f64,
    /// Fraction of stance skipped before toe-off (push-off)
    pub stance_end_fraction: f64,
}

/// Time normalisation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Number of points spanning 0-100 % of the gait cycle
    pub points: usize,
}

impl AnalysisConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| GaitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        if self.gait_cycles == 0 {
            return Err(GaitError::Config(
                "gait_cycles must be at least 1".to_string(),
            ));
        }
        if self.events.heading_axis > 2 {
            return Err(GaitError::Config(format!(
                "heading_axis must be 0, 1 or 2, got {}",
                self.events.heading_axis
            )));
        }
        if self.filter.order == 0 {
            return Err(GaitError::Config("filter order must be positive".to_string()));
        }
        let t = &self.treadmill;
        for (name, value) in [
            ("stance_start_fraction", t.stance_start_fraction),
            ("stance_end_fraction", t.stance_end_fraction),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(GaitError::Config(format!(
                    "{} must be in [0, 1), got {}",
                    name, value
                )));
            }
        }
        if t.stance_start_fraction + t.stance_end_fraction >= 1.0 {
            return Err(GaitError::Config(
                "stance trim fractions leave no stance window".to_string(),
            ));
        }
        if self.normalization.points < 2 {
            return Err(GaitError::Config(format!(
                "normalization points must be at least 2, got {}",
                self.normalization.points
            )));
        }
        Ok(())
    }

    /// Whether marker filtering is enabled
    pub fn filtering_enabled(&self) -> bool {
        self.filter.cutoff_hz > 0.0
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            leg: LegSelection::Auto,
            gait_cycles: 1,
            filter: FilterConfig::default(),
            events: EventConfig::default(),
            treadmill: TreadmillConfig::default(),
            normalization: NormalizationConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: -1.0,
            // Run forward and backward: 4th-order zero-phase response overall
            order: 2,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self { heading_axis: 0 }
    }
}

impl Default for TreadmillConfig {
    fn default() -> Self {
        Self {
            overground_threshold: OVERGROUND_SPEED_THRESHOLD,
            stance_start_fraction: STANCE_START_FRACTION,
            stance_end_fraction: STANCE_END_FRACTION,
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            points: NORMALIZED_CYCLE_POINTS,
        }
    }
}
