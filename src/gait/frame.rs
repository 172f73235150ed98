//! Per-cycle gait reference frames.
//!
//! Each frame is a rotation whose columns are the heading (`x`), vertical
//! (`y`) and mediolateral (`z`) axes expressed in world coordinates.

use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

use crate::constants::AXIS_NORM_EPSILON;
use crate::error::{GaitError, Result};
use crate::gait::events::GaitEventTable;
use crate::gait::treadmill::Locomotion;
use crate::markers::{MarkerTrajectorySet, Side};

/// Gait-cycle-local coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaitFrame {
    rotation: Matrix3<f64>,
}

impl GaitFrame {
    /// Build a frame from unit heading and mediolateral axes
    ///
    /// The vertical axis is `z × x` and is not renormalized.
    pub fn from_axes(heading: Vector3<f64>, mediolateral: Vector3<f64>) -> Self {
        let vertical = mediolateral.cross(&heading);
        Self {
            rotation: Matrix3::from_columns(&[heading, vertical, mediolateral]),
        }
    }

    pub fn heading(&self) -> Vector3<f64> {
        self.rotation.column(0).into_owned()
    }

    pub fn vertical(&self) -> Vector3<f64> {
        self.rotation.column(1).into_owned()
    }

    pub fn mediolateral(&self) -> Vector3<f64> {
        self.rotation.column(2).into_owned()
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    /// Express a world-frame vector in gait coordinates
    pub fn to_gait(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * v
    }
}

fn unit_axis(v: Vector3<f64>, cycle: usize, axis: &'static str) -> Result<Vector3<f64>> {
    let norm = v.norm();
    if !norm.is_finite() || norm < AXIS_NORM_EPSILON {
        return Err(GaitError::DegenerateFrame { cycle, axis });
    }
    Ok(v / norm)
}

/// Build one gait frame per cycle
///
/// The heading follows the pelvis center (mean of both ASIS and PSIS
/// markers) from heel-strike to next heel-strike when overground. On a
/// treadmill the pelvis stays put, so the heading follows the ipsilateral
/// ankle through swing, from toe-off to next heel-strike. The mediolateral
/// axis is the left-to-right ASIS vector averaged over the cycle.
///
/// # Errors
/// * `GaitError::MissingMarker` if a pelvis or ankle marker is absent
/// * `GaitError::DegenerateFrame` if an axis has (near) zero length
pub fn compute_gait_frames(
    markers: &MarkerTrajectorySet,
    events: &GaitEventTable,
    locomotion: Locomotion,
) -> Result<Vec<GaitFrame>> {
    let right_asis = markers.marker(&Side::Right.asis())?;
    let left_asis = markers.marker(&Side::Left.asis())?;

    let heading_track = if locomotion.is_overground() {
        markers.centroid(&[
            Side::Right.asis(),
            Side::Left.asis(),
            Side::Right.psis(),
            Side::Left.psis(),
        ])?
    } else {
        markers.marker(&events.ipsilateral_leg.ankle())?.to_vec()
    };

    events
        .ipsilateral
        .iter()
        .enumerate()
        .map(|(i, cycle)| {
            let heading_start = if locomotion.is_overground() {
                cycle.heel_strike
            } else {
                cycle.toe_off
            };
            let heading = unit_axis(
                heading_track[cycle.next_heel_strike] - heading_track[heading_start],
                i,
                "heading",
            )?;

            let span = cycle.heel_strike..cycle.next_heel_strike;
            let lateral_sum: Vector3<f64> = right_asis[span.clone()]
                .iter()
                .zip(&left_asis[span.clone()])
                .map(|(r, l)| r - l)
                .sum();
            let mediolateral = unit_axis(lateral_sum / span.len() as f64, i, "mediolateral")?;

            Ok(GaitFrame::from_axes(heading, mediolateral))
        })
        .collect()
}
