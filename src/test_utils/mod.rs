use std::collections::BTreeMap;

use nalgebra::Vector3;

use crate::markers::{MarkerTrajectorySet, Side};

pub const SAMPLE_RATE: f64 = 100.0;

pub fn time_base(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / SAMPLE_RATE).collect()
}

/// Triangular bumps of height 0.1 peaking exactly at `peaks`
pub fn bump_signal(n: usize, peaks: &[usize]) -> Vec<f64> {
    (0..n)
        .map(|i| {
            peaks
                .iter()
                .map(|&p| (0.1 - 0.01 * (i as f64 - p as f64).abs()).max(0.0))
                .fold(0.0, f64::max)
        })
        .collect()
}

/// Static full marker set with all pelvis, foot and ankle markers
pub fn static_markers(n: usize) -> BTreeMap<String, Vec<Vector3<f64>>> {
    let mut markers = BTreeMap::new();
    for side in [Side::Left, Side::Right] {
        let z = if side == Side::Right { 1.0 } else { -1.0 };
        markers.insert(side.asis(), vec![Vector3::new(0.1, 1.0, 0.12 * z); n]);
        markers.insert(side.psis(), vec![Vector3::new(-0.1, 1.0, 0.1 * z); n]);
        markers.insert(side.calcaneus(), vec![Vector3::new(0.0, 0.03, 0.1 * z); n]);
        markers.insert(side.toe(), vec![Vector3::new(0.2, 0.02, 0.1 * z); n]);
        markers.insert(side.ankle(), vec![Vector3::new(0.05, 0.08, 0.135 * z); n]);
        markers.insert(side.medial_ankle(), vec![Vector3::new(0.05, 0.08, 0.065 * z); n]);
    }
    markers
}

/// Marker set whose heel and toe signals encode the given events
///
/// Heel-strikes are maxima of calcaneus-minus-PSIS along x, toe-offs are
/// minima of toe-minus-PSIS along x.
pub fn markers_with_events(
    n: usize,
    right_hs: &[usize],
    right_to: &[usize],
    left_hs: &[usize],
    left_to: &[usize],
) -> MarkerTrajectorySet {
    let mut markers = static_markers(n);
    for (side, hs, to) in [(Side::Right, right_hs, right_to), (Side::Left, left_hs, left_to)] {
        let psis_x = markers[&side.psis()][0].x;
        let heel = bump_signal(n, hs);
        let toe = bump_signal(n, to);
        for (i, p) in markers.get_mut(&side.calcaneus()).unwrap().iter_mut().enumerate() {
            p.x = psis_x + heel[i];
        }
        for (i, p) in markers.get_mut(&side.toe()).unwrap().iter_mut().enumerate() {
            p.x = psis_x + 0.2 - toe[i];
        }
    }
    MarkerTrajectorySet::new(time_base(n), markers).unwrap()
}
