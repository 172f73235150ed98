//! Joint-coordinate and center-of-mass data consumed by the gait analysis.

use nalgebra::Vector3;
use serde::Serialize;

use crate::error::{GaitError, Result};
use crate::signal_processing::{low_pass_filter, mean_sample_interval};

/// Source of joint coordinates and center-of-mass trajectories
///
/// All series share the time base returned by `time()`, which must match
/// the marker trajectories of the same trial.
pub trait KinematicsProvider {
    fn time(&self) -> &[f64];
    fn coordinate_values(&self) -> Result<CoordinateTable>;
    fn center_of_mass_values(&self) -> Result<CenterOfMass>;
}

/// Named columns of equal length, one row per sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl CoordinateTable {
    /// # Errors
    /// Returns `GaitError::LengthMismatch` if the name and column counts
    /// differ or the columns have different lengths
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(GaitError::LengthMismatch {
                what: "coordinate names".to_string(),
                expected: columns.len(),
                actual: names.len(),
            });
        }
        if let Some(first) = columns.first() {
            for (name, column) in names.iter().zip(&columns) {
                if column.len() != first.len() {
                    return Err(GaitError::LengthMismatch {
                        what: format!("coordinate '{}'", name),
                        expected: first.len(),
                        actual: column.len(),
                    });
                }
            }
        }
        Ok(Self { names, columns })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[index]).collect()
    }

    /// Apply `f` to every column, keeping names and order
    pub fn map_columns<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&[f64]) -> Result<Vec<f64>>,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| f(c.as_slice()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(self.names.clone(), columns)
    }
}

/// Whole-body center-of-mass trajectory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenterOfMass {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl CenterOfMass {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        for (axis, values) in [("y", &y), ("z", &z)] {
            if values.len() != x.len() {
                return Err(GaitError::LengthMismatch {
                    what: format!("center of mass {}", axis),
                    expected: x.len(),
                    actual: values.len(),
                });
            }
        }
        Ok(Self { x, y, z })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn position(&self, index: usize) -> Vector3<f64> {
        Vector3::new(self.x[index], self.y[index], self.z[index])
    }
}

/// In-memory kinematics for one trial
///
/// Holds already-computed coordinate values and center-of-mass positions,
/// e.g. as loaded from disk or produced by the simulator.
#[derive(Debug, Clone)]
pub struct TrialKinematics {
    time: Vec<f64>,
    coordinates: CoordinateTable,
    center_of_mass: CenterOfMass,
}

impl TrialKinematics {
    pub fn new(time: Vec<f64>, coordinates: CoordinateTable, center_of_mass: CenterOfMass) -> Result<Self> {
        mean_sample_interval(&time)?;
        if coordinates.column_count() > 0 && coordinates.row_count() != time.len() {
            return Err(GaitError::LengthMismatch {
                what: "coordinate values".to_string(),
                expected: time.len(),
                actual: coordinates.row_count(),
            });
        }
        if center_of_mass.len() != time.len() {
            return Err(GaitError::LengthMismatch {
                what: "center of mass".to_string(),
                expected: time.len(),
                actual: center_of_mass.len(),
            });
        }
        Ok(Self {
            time,
            coordinates,
            center_of_mass,
        })
    }

    /// Copy with coordinate and center-of-mass columns low-pass filtered
    ///
    /// A cutoff of zero or below returns an unfiltered copy.
    pub fn low_pass_filtered(&self, cutoff_hz: f64, order: usize) -> Result<Self> {
        if cutoff_hz <= 0.0 {
            return Ok(self.clone());
        }
        let filter = |column: &[f64]| low_pass_filter(&self.time, column, cutoff_hz, order);
        let coordinates = self.coordinates.map_columns(&filter)?;
        let center_of_mass = CenterOfMass::new(
            filter(&self.center_of_mass.x)?,
            filter(&self.center_of_mass.y)?,
            filter(&self.center_of_mass.z)?,
        )?;
        Self::new(self.time.clone(), coordinates, center_of_mass)
    }

    pub fn coordinates(&self) -> &CoordinateTable {
        &self.coordinates
    }

    pub fn center_of_mass(&self) -> &CenterOfMass {
        &self.center_of_mass
    }
}

impl KinematicsProvider for TrialKinematics {
    fn time(&self) -> &[f64] {
        &self.time
    }

    fn coordinate_values(&self) -> Result<CoordinateTable> {
        Ok(self.coordinates.clone())
    }

    fn center_of_mass_values(&self) -> Result<CenterOfMass> {
        Ok(self.center_of_mass.clone())
    }
}
