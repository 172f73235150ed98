use serde::Serialize;

use crate::config::TreadmillConfig;
use crate::error::Result;
use crate::gait::events::GaitEventTable;
use crate::markers::MarkerTrajectorySet;
use crate::signal_processing::{mean, round_index};

/// Whether the subject walked overground or on a moving belt
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Locomotion {
    Overground,
    Treadmill { belt_speed: f64 },
}

impl Locomotion {
    /// Belt speed, exactly zero when overground
    pub fn speed(&self) -> f64 {
        match self {
            Self::Overground => 0.0,
            Self::Treadmill { belt_speed } => *belt_speed,
        }
    }

    pub fn is_overground(&self) -> bool {
        matches!(self, Self::Overground)
    }
}

/// Treadmill belt speed estimate for a trial
#[derive(Debug, Clone, Serialize)]
pub struct TreadmillEstimate {
    /// Mid-stance foot speed per cycle, `None` when the stance window is too short
    pub per_cycle: Vec<Option<f64>>,
    /// Mean of the per-cycle speeds before overground clamping
    pub raw_speed: f64,
    /// Classification after clamping
    pub locomotion: Locomotion,
}

impl TreadmillEstimate {
    pub fn speed(&self) -> f64 {
        self.locomotion.speed()
    }
}

/// Estimate treadmill belt speed from ipsilateral ankle motion during stance
///
/// During mid-stance the foot is fixed to the belt, so its world-frame
/// speed is the belt speed. The stance window of each cycle runs from
/// heel-strike + `stance_start_fraction` of stance to toe-off -
/// `stance_end_fraction` of stance, excluding loading response and
/// push-off. Estimates below `overground_threshold` are clamped to zero.
///
/// # Arguments
/// * `markers` - Trajectories containing the ipsilateral ankle marker
/// * `events` - Segmented gait cycles
/// * `config` - Window fractions and overground threshold
pub fn estimate_treadmill_speed(
    markers: &MarkerTrajectorySet,
    events: &GaitEventTable,
    config: &TreadmillConfig,
) -> Result<TreadmillEstimate> {
    let ankle = markers.marker(&events.ipsilateral_leg.ankle())?;
    let dt = markers.sample_interval();

    let per_cycle: Vec<Option<f64>> = events
        .ipsilateral
        .iter()
        .enumerate()
        .map(|(i, cycle)| {
            let stance = (cycle.toe_off - cycle.heel_strike) as f64;
            let start =
                round_index(cycle.heel_strike as f64 + config.stance_start_fraction * stance) as usize;
            let end = round_index(cycle.toe_off as f64 - config.stance_end_fraction * stance) as usize;

            if end <= start + 1 {
                log::debug!(
                    "Cycle {}: stance window {}..{} too short for a velocity estimate",
                    i,
                    start,
                    end
                );
                return None;
            }

            let window = &ankle[start..end];
            let steps = window.len() - 1;
            let mean_step = window.windows(2).map(|w| w[1] - w[0]).sum::<nalgebra::Vector3<f64>>()
                / steps as f64;
            let speed = mean_step.norm() / dt;
            if !speed.is_finite() {
                log::warn!(
                    "Cycle {}: non-finite ankle speed in stance window {}..{}, skipped",
                    i,
                    start,
                    end
                );
                return None;
            }
            Some(speed)
        })
        .collect();

    let valid: Vec<f64> = per_cycle.iter().flatten().copied().collect();
    let raw_speed = if valid.is_empty() { 0.0 } else { mean(&valid) };

    let locomotion = if raw_speed < config.overground_threshold {
        Locomotion::Overground
    } else {
        Locomotion::Treadmill {
            belt_speed: raw_speed,
        }
    };

    match locomotion {
        Locomotion::Overground => log::info!(
            "Overground trial (foot speed {:.3} below {:.2})",
            raw_speed,
            config.overground_threshold
        ),
        Locomotion::Treadmill { belt_speed } => {
            log::info!("Treadmill trial, belt speed {:.3}", belt_speed)
        }
    }

    Ok(TreadmillEstimate {
        per_cycle,
        raw_speed,
        locomotion,
    })
}
