//! Marker trajectories sampled on a shared time base.
//!
//! Marker names follow the OpenCap "study" marker set, e.g. `r_calc_study`,
//! `L_toe_study`, `r.ASIS_study`. Right-side names start with `r`, left-side
//! names with `L`.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Vector3;
use serde::Serialize;

use crate::error::{GaitError, Result};
use crate::signal_processing::{low_pass_filter, mean_sample_interval};

/// Body side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "r",
        }
    }

    /// Calcaneus (heel) marker
    pub fn calcaneus(self) -> String {
        format!("{}_calc_study", self.prefix())
    }

    /// Toe marker
    pub fn toe(self) -> String {
        format!("{}_toe_study", self.prefix())
    }

    /// Lateral ankle (malleolus) marker
    pub fn ankle(self) -> String {
        format!("{}_ankle_study", self.prefix())
    }

    /// Medial ankle (malleolus) marker
    pub fn medial_ankle(self) -> String {
        format!("{}_mankle_study", self.prefix())
    }

    /// Anterior superior iliac spine marker
    pub fn asis(self) -> String {
        format!("{}.ASIS_study", self.prefix())
    }

    /// Posterior superior iliac spine marker
    pub fn psis(self) -> String {
        format!("{}.PSIS_study", self.prefix())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Named 3D marker trajectories plus their shared time vector
///
/// Every trajectory has exactly one point per time sample. The set is
/// immutable once built; filtering produces a new set.
#[derive(Debug, Clone)]
pub struct MarkerTrajectorySet {
    time: Vec<f64>,
    markers: BTreeMap<String, Vec<Vector3<f64>>>,
}

impl MarkerTrajectorySet {
    /// Build a trajectory set, checking the time base and marker lengths
    ///
    /// # Errors
    /// Returns `GaitError::InvalidTimeBase` if `time` is not strictly
    /// increasing, or `GaitError::LengthMismatch` if any marker has a
    /// different number of samples than `time`
    pub fn new(time: Vec<f64>, markers: BTreeMap<String, Vec<Vector3<f64>>>) -> Result<Self> {
        mean_sample_interval(&time)?;
        for (name, points) in &markers {
            if points.len() != time.len() {
                return Err(GaitError::LengthMismatch {
                    what: format!("marker '{}'", name),
                    expected: time.len(),
                    actual: points.len(),
                });
            }
        }
        Ok(Self { time, markers })
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Interval between the first two samples
    pub fn sample_interval(&self) -> f64 {
        self.time[1] - self.time[0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.markers.contains_key(name)
    }

    pub fn marker_names(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    /// Trajectory of one marker
    ///
    /// # Errors
    /// Returns `GaitError::MissingMarker` if the marker is absent
    pub fn marker(&self, name: &str) -> Result<&[Vector3<f64>]> {
        self.markers
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| GaitError::MissingMarker(name.to_string()))
    }

    /// One coordinate axis of a marker relative to a reference marker
    ///
    /// # Errors
    /// `GaitError::Config` if `axis` is not 0, 1 or 2
    pub fn relative_axis_signal(&self, name: &str, reference: &str, axis: usize) -> Result<Vec<f64>> {
        if axis > 2 {
            return Err(GaitError::Config(format!(
                "axis must be 0, 1 or 2, got {}",
                axis
            )));
        }
        let points = self.marker(name)?;
        let reference = self.marker(reference)?;
        Ok(points
            .iter()
            .zip(reference)
            .map(|(p, r)| p[axis] - r[axis])
            .collect())
    }

    /// Per-sample midpoint of two markers
    pub fn midpoint(&self, a: &str, b: &str) -> Result<Vec<Vector3<f64>>> {
        let a = self.marker(a)?;
        let b = self.marker(b)?;
        Ok(a.iter().zip(b).map(|(p, q)| (p + q) / 2.0).collect())
    }

    /// Per-sample mean of several markers
    pub fn centroid(&self, names: &[String]) -> Result<Vec<Vector3<f64>>> {
        let trajectories = names
            .iter()
            .map(|name| self.marker(name))
            .collect::<Result<Vec<_>>>()?;
        let count = trajectories.len() as f64;
        Ok((0..self.len())
            .map(|i| trajectories.iter().map(|t| t[i]).sum::<Vector3<f64>>() / count)
            .collect())
    }

    /// Copy of the set with every marker axis low-pass filtered
    ///
    /// A cutoff of zero or below returns an unfiltered copy.
    pub fn low_pass_filtered(&self, cutoff_hz: f64, order: usize) -> Result<Self> {
        if cutoff_hz <= 0.0 {
            return Ok(self.clone());
        }

        let mut filtered = BTreeMap::new();
        for (name, points) in &self.markers {
            let mut axes = Vec::with_capacity(3);
            for axis in 0..3 {
                let signal: Vec<f64> = points.iter().map(|p| p[axis]).collect();
                axes.push(low_pass_filter(&self.time, &signal, cutoff_hz, order)?);
            }
            let smoothed = (0..points.len())
                .map(|i| Vector3::new(axes[0][i], axes[1][i], axes[2][i]))
                .collect();
            filtered.insert(name.clone(), smoothed);
        }
        log::debug!(
            "Filtered {} markers at {:.1} Hz",
            filtered.len(),
            cutoff_hz
        );

        Ok(Self {
            time: self.time.clone(),
            markers: filtered,
        })
    }

    /// Consume the set, returning its time vector and trajectories
    pub fn into_parts(self) -> (Vec<f64>, BTreeMap<String, Vec<Vector3<f64>>>) {
        (self.time, self.markers)
    }
}
