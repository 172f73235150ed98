//! Synthetic walking trials.
//!
//! Each foot is rigid. In the belt frame it rests during stance and moves
//! forward at constant velocity during swing, so the heel is furthest
//! ahead of the pelvis exactly at heel-strike and the toe furthest behind
//! exactly at toe-off. World positions are belt-frame positions carried
//! backward by the belt. The right leg is on the +z side.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use nalgebra::Vector3;

use super::noise::{MarkerNoiseConfig, apply_marker_noise};
use crate::error::{GaitError, Result};
use crate::kinematics::{CenterOfMass, CoordinateTable, TrialKinematics};
use crate::markers::{MarkerTrajectorySet, Side};

const PELVIS_HEIGHT: f64 = 0.95;
const PELVIS_BOB: f64 = 0.01;
const ASIS_HALF_WIDTH: f64 = 0.12;
const PSIS_HALF_WIDTH: f64 = 0.08;
const HEEL_HEIGHT: f64 = 0.03;
const FOOT_LENGTH: f64 = 0.2;
const SWING_CLEARANCE: f64 = 0.1;
const MALLEOLUS_HALF_WIDTH: f64 = 0.035;
/// Heel position ahead of the pelvis at heel-strike, as a fraction of stride
const HEEL_REACH: f64 = 0.3;

/// Parameters of a synthetic walking trial
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct WalkingTrialConfig {
    pub sample_rate: f64,
    pub duration_secs: f64,
    /// Heel-strike to heel-strike, seconds
    pub cycle_period_secs: f64,
    /// Ground-frame walking speed, m/s
    pub gait_speed: f64,
    /// Treadmill belt speed, m/s; zero for overground walking
    pub belt_speed: f64,
    /// Mediolateral distance between ankle centers, m
    pub step_width: f64,
    /// Stance fraction of the gait cycle
    pub duty_factor: f64,
    /// Time of the first right heel-strike; left heel-strikes follow half a cycle later
    pub first_heel_strike_secs: f64,
    pub noise: Option<MarkerNoiseConfig>,
}

impl Default for WalkingTrialConfig {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            duration_secs: 6.0,
            cycle_period_secs: 1.0,
            gait_speed: 1.2,
            belt_speed: 0.0,
            step_width: 0.16,
            duty_factor: 0.6,
            first_heel_strike_secs: 0.5,
            noise: None,
        }
    }
}

impl WalkingTrialConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("sample_rate", self.sample_rate),
            ("duration_secs", self.duration_secs),
            ("cycle_period_secs", self.cycle_period_secs),
            ("gait_speed", self.gait_speed),
        ] {
            if !(value > 0.0) {
                return Err(GaitError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(0.0..=self.gait_speed).contains(&self.belt_speed) {
            return Err(GaitError::Config(format!(
                "belt_speed must be in [0, gait_speed], got {}",
                self.belt_speed
            )));
        }
        if !(self.duty_factor > 0.0 && self.duty_factor < 1.0) {
            return Err(GaitError::Config(format!(
                "duty_factor must be in (0, 1), got {}",
                self.duty_factor
            )));
        }
        if self.step_width < 0.0 {
            return Err(GaitError::Config("step_width must not be negative".to_string()));
        }
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        (self.duration_secs * self.sample_rate).round() as usize
    }

    fn stride(&self) -> f64 {
        self.gait_speed * self.cycle_period_secs
    }

    fn first_heel_strike(&self, side: Side) -> f64 {
        match side {
            Side::Right => self.first_heel_strike_secs,
            Side::Left => self.first_heel_strike_secs + 0.5 * self.cycle_period_secs,
        }
    }

    /// Heel-strike times of one leg inside the trial
    pub fn heel_strike_times(&self, side: Side) -> Vec<f64> {
        self.event_times(self.first_heel_strike(side))
    }

    /// Toe-off times of one leg inside the trial
    pub fn toe_off_times(&self, side: Side) -> Vec<f64> {
        self.event_times(self.first_heel_strike(side) + self.duty_factor * self.cycle_period_secs)
    }

    fn event_times(&self, phase_origin: f64) -> Vec<f64> {
        let period = self.cycle_period_secs;
        let mut t = phase_origin - (phase_origin / period).floor() * period;
        let mut times = Vec::new();
        while t < self.duration_secs {
            times.push(t);
            t += period;
        }
        times
    }

    /// Cycle number and fraction of the gait cycle at time `t`, 0 at heel-strike
    fn phase(&self, side: Side, t: f64) -> (f64, f64) {
        let cycles = (t - self.first_heel_strike(side)) / self.cycle_period_secs;
        let k = cycles.floor();
        (k, cycles - k)
    }

    /// Heel position of one foot in the belt frame
    fn heel_in_belt_frame(&self, side: Side, t: f64) -> Vector3<f64> {
        let (k, phase) = self.phase(side, t);
        let strike_time = self.first_heel_strike(side) + k * self.cycle_period_secs;
        let planted = self.gait_speed * strike_time + HEEL_REACH * self.stride();

        let swing = if phase <= self.duty_factor {
            0.0
        } else {
            (phase - self.duty_factor) / (1.0 - self.duty_factor)
        };
        let x = planted + swing * self.stride();
        let y = HEEL_HEIGHT + SWING_CLEARANCE * (PI * swing).sin();
        Vector3::new(x, y, lateral(side) * 0.5 * self.step_width)
    }
}

fn lateral(side: Side) -> f64 {
    match side {
        Side::Right => 1.0,
        Side::Left => -1.0,
    }
}

/// Markers and kinematics of a synthetic trial
#[derive(Debug, Clone)]
pub struct SyntheticTrial {
    pub markers: MarkerTrajectorySet,
    pub kinematics: TrialKinematics,
}

/// Generate a synthetic walking trial
///
/// Coordinates are simple sinusoids of each leg's cycle phase, in degrees.
/// The center of mass moves with the pelvis.
pub fn generate_walking_trial(config: &WalkingTrialConfig) -> Result<SyntheticTrial> {
    config.validate()?;

    let n = config.sample_count();
    let time: Vec<f64> = (0..n).map(|i| i as f64 / config.sample_rate).collect();
    let mut markers: BTreeMap<String, Vec<Vector3<f64>>> = BTreeMap::new();
    let mut com = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));

    for &t in &time {
        let belt_offset = Vector3::new(config.belt_speed * t, 0.0, 0.0);
        let bob = PELVIS_BOB * (4.0 * PI * t / config.cycle_period_secs).cos();
        let pelvis = Vector3::new(config.gait_speed * t, PELVIS_HEIGHT + bob, 0.0) - belt_offset;

        com.0.push(pelvis.x);
        com.1.push(pelvis.y);
        com.2.push(pelvis.z);

        let mut push = |name: String, p: Vector3<f64>| markers.entry(name).or_default().push(p);
        for side in [Side::Right, Side::Left] {
            let z = lateral(side);
            push(side.asis(), pelvis + Vector3::new(0.1, 0.05, z * ASIS_HALF_WIDTH));
            push(side.psis(), pelvis + Vector3::new(-0.1, 0.05, z * PSIS_HALF_WIDTH));

            let heel = config.heel_in_belt_frame(side, t) - belt_offset;
            push(side.calcaneus(), heel);
            push(side.toe(), heel + Vector3::new(FOOT_LENGTH, -0.01, 0.0));
            push(side.ankle(), heel + Vector3::new(0.05, 0.05, z * MALLEOLUS_HALF_WIDTH));
            push(side.medial_ankle(), heel + Vector3::new(0.05, 0.05, -z * MALLEOLUS_HALF_WIDTH));
        }
    }

    if let Some(noise) = &config.noise {
        apply_marker_noise(&mut markers, noise)?;
    }

    let mut names = Vec::new();
    let mut columns = Vec::new();
    for (side, suffix) in [(Side::Right, "r"), (Side::Left, "l")] {
        let phases: Vec<f64> = time.iter().map(|&t| config.phase(side, t).1).collect();
        names.push(format!("hip_flexion_{}", suffix));
        columns.push(phases.iter().map(|&p| 10.0 + 25.0 * (2.0 * PI * p).cos()).collect());
        names.push(format!("knee_angle_{}", suffix));
        columns.push(phases.iter().map(|&p| 30.0 - 28.0 * (2.0 * PI * p).cos()).collect());
    }
    names.push("pelvis_tilt".to_string());
    columns.push(vec![-5.0; n]);

    let coordinates = CoordinateTable::new(names, columns)?;
    let center_of_mass = CenterOfMass::new(com.0, com.1, com.2)?;
    log::debug!(
        "Generated {} samples at {} Hz, gait speed {} m/s, belt speed {} m/s",
        n,
        config.sample_rate,
        config.gait_speed,
        config.belt_speed
    );

    Ok(SyntheticTrial {
        markers: MarkerTrajectorySet::new(time.clone(), markers)?,
        kinematics: TrialKinematics::new(time, coordinates, center_of_mass)?,
    })
}
