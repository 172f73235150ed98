pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod gait;
pub mod kinematics;
pub mod loader;
pub mod markers;
pub mod output;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

#[cfg(test)]
mod test_utils;

pub use analysis::GaitAnalysis;
pub use config::AnalysisConfig;
pub use error::{GaitError, Result};
pub use markers::{MarkerTrajectorySet, Side};
