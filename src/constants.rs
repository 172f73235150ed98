//! Numeric constants for gait-event and metric computations
//!
//! These constants define thresholds and epsilon values shared by the
//! segmentation, frame and scalar modules.

/// Treadmill speed estimates below this (in marker units per second) are
/// treated as overground walking and clamped to exactly zero.
pub const OVERGROUND_SPEED_THRESHOLD: f64 = 0.3;

/// Fraction of stance trimmed after heel-strike before measuring belt speed.
pub const STANCE_START_FRACTION: f64 = 0.1;

/// Fraction of stance trimmed before toe-off when measuring belt speed.
pub const STANCE_END_FRACTION: f64 = 0.3;

/// Number of samples in a time-normalised gait cycle (0..=100 %).
pub const NORMALIZED_CYCLE_POINTS: usize = 101;

/// Minimum vector norm accepted when building a unit axis.
/// Shorter heading or mediolateral vectors cannot define a gait frame.
pub const AXIS_NORM_EPSILON: f64 = 1e-12;

/// Number of constant-input samples used to prime a filter to steady state.
pub const FILTER_PRIMING_SAMPLES: usize = 512;
