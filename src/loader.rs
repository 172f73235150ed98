//! Trial data on disk.
//!
//! A session directory holds one marker file and one kinematics file per
//! trial:
//!
//! ```text
//! <session>/MarkerData/<trial>.json
//! <session>/OpenSimData/Kinematics/<trial>.json
//! ```
//!
//! Marker files store the time vector and `[x, y, z]` points per marker.
//! Kinematics files store the time vector, named coordinate columns and
//! the center-of-mass trajectory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kinematics::{CenterOfMass, CoordinateTable, KinematicsProvider, TrialKinematics};
use crate::markers::MarkerTrajectorySet;

#[derive(Debug, Serialize, Deserialize)]
struct MarkerFile {
    time: Vec<f64>,
    markers: BTreeMap<String, Vec<[f64; 3]>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CoordinateColumn {
    name: String,
    values: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CenterOfMassFile {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct KinematicsFile {
    time: Vec<f64>,
    coordinates: Vec<CoordinateColumn>,
    center_of_mass: CenterOfMassFile,
}

pub fn marker_path(session: &Path, trial: &str) -> PathBuf {
    session.join("MarkerData").join(format!("{}.json", trial))
}

pub fn kinematics_path(session: &Path, trial: &str) -> PathBuf {
    session
        .join("OpenSimData")
        .join("Kinematics")
        .join(format!("{}.json", trial))
}

/// Load the marker trajectories of a trial
pub fn load_markers(session: &Path, trial: &str) -> Result<MarkerTrajectorySet> {
    let path = marker_path(session, trial);
    log::debug!("Loading markers from {}", path.display());
    let file: MarkerFile = serde_json::from_str(&fs::read_to_string(&path)?)?;

    let markers = file
        .markers
        .into_iter()
        .map(|(name, points)| {
            let points = points.iter().map(|p| Vector3::from(*p)).collect();
            (name, points)
        })
        .collect();
    MarkerTrajectorySet::new(file.time, markers)
}

/// Load the coordinate values and center of mass of a trial
pub fn load_kinematics(session: &Path, trial: &str) -> Result<TrialKinematics> {
    let path = kinematics_path(session, trial);
    log::debug!("Loading kinematics from {}", path.display());
    let file: KinematicsFile = serde_json::from_str(&fs::read_to_string(&path)?)?;

    let (names, columns) = file
        .coordinates
        .into_iter()
        .map(|c| (c.name, c.values))
        .unzip();
    let coordinates = CoordinateTable::new(names, columns)?;
    let com = file.center_of_mass;
    let center_of_mass = CenterOfMass::new(com.x, com.y, com.z)?;
    TrialKinematics::new(file.time, coordinates, center_of_mass)
}

/// Load both halves of a trial
pub fn load_trial(session: &Path, trial: &str) -> Result<(MarkerTrajectorySet, TrialKinematics)> {
    Ok((load_markers(session, trial)?, load_kinematics(session, trial)?))
}

/// Write a trial in the session layout read by [`load_trial`]
pub fn save_trial(
    session: &Path,
    trial: &str,
    markers: &MarkerTrajectorySet,
    kinematics: &TrialKinematics,
) -> Result<()> {
    let mut marker_file = MarkerFile {
        time: markers.time().to_vec(),
        markers: BTreeMap::new(),
    };
    for name in markers.marker_names() {
        let points = markers.marker(name)?.iter().map(|p| [p.x, p.y, p.z]).collect();
        marker_file.markers.insert(name.to_string(), points);
    }

    let coordinates = kinematics.coordinates();
    let com = kinematics.center_of_mass();
    let kinematics_file = KinematicsFile {
        time: kinematics.time().to_vec(),
        coordinates: coordinates
            .names()
            .iter()
            .zip(coordinates.columns())
            .map(|(name, values)| CoordinateColumn {
                name: name.clone(),
                values: values.clone(),
            })
            .collect(),
        center_of_mass: CenterOfMassFile {
            x: com.x.clone(),
            y: com.y.clone(),
            z: com.z.clone(),
        },
    };

    for (path, content) in [
        (marker_path(session, trial), serde_json::to_string(&marker_file)?),
        (kinematics_path(session, trial), serde_json::to_string(&kinematics_file)?),
    ] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        log::info!("Wrote {}", path.display());
    }
    Ok(())
}
