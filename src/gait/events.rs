//! Gait event detection and gait-cycle segmentation.
//!
//! Heel-strikes are the peaks of the calcaneus position relative to the
//! ipsilateral PSIS along the heading axis (the heel is furthest ahead of
//! the pelvis at initial contact). Toe-offs are the troughs of the toe
//! position relative to the PSIS (the toe is furthest behind at push-off).
//!
//! Cycles are built backward from the most recent ipsilateral heel-strike,
//! so the first cycle in a table is the latest one in the trial.

use serde::Serialize;

use crate::config::{EventConfig, LegSelection};
use crate::error::{GaitError, Result};
use crate::markers::{MarkerTrajectorySet, Side};
use crate::signal_processing::{PeakDetector, find_last_between};

/// Event labels of an ipsilateral cycle, in column order
pub const IPSILATERAL_EVENT_NAMES: [&str; 3] = ["HS", "TO", "HS"];

/// Event labels of the contralateral events of a cycle, in column order
pub const CONTRALATERAL_EVENT_NAMES: [&str; 2] = ["TO", "HS"];

/// Heel-strike and toe-off candidates of one leg, ascending sample indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCandidates {
    pub heel_strikes: Vec<usize>,
    pub toe_offs: Vec<usize>,
}

/// Sample indices bounding one ipsilateral gait cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpsilateralCycle {
    pub heel_strike: usize,
    pub toe_off: usize,
    pub next_heel_strike: usize,
}

impl IpsilateralCycle {
    pub fn indices(&self) -> [usize; 3] {
        [self.heel_strike, self.toe_off, self.next_heel_strike]
    }
}

/// Sample indices of the opposite leg's events inside an ipsilateral cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContralateralEvents {
    pub toe_off: usize,
    pub heel_strike: usize,
}

/// Times in seconds of an ipsilateral cycle's events
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleTimes {
    pub heel_strike: f64,
    pub toe_off: f64,
    pub next_heel_strike: f64,
}

impl CycleTimes {
    pub fn duration(&self) -> f64 {
        self.next_heel_strike - self.heel_strike
    }
}

/// Times in seconds of the contralateral events of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContralateralTimes {
    pub toe_off: f64,
    pub heel_strike: f64,
}

/// Segmentation result for one trial
///
/// All vectors have one entry per cycle, most recent cycle first. A cycle
/// whose contralateral events could not be found inside it keeps its
/// ipsilateral events and has `None` contralateral entries.
#[derive(Debug, Clone, Serialize)]
pub struct GaitEventTable {
    pub ipsilateral_leg: Side,
    pub ipsilateral: Vec<IpsilateralCycle>,
    pub contralateral: Vec<Option<ContralateralEvents>>,
    pub ipsilateral_times: Vec<CycleTimes>,
    pub contralateral_times: Vec<Option<ContralateralTimes>>,
}

impl GaitEventTable {
    pub fn cycle_count(&self) -> usize {
        self.ipsilateral.len()
    }

    pub fn contralateral_leg(&self) -> Side {
        self.ipsilateral_leg.opposite()
    }

    /// Whether both contralateral events of a cycle were found
    pub fn is_complete(&self, cycle: usize) -> bool {
        self.contralateral[cycle].is_some()
    }

    /// Cycle duration in seconds, heel-strike to heel-strike
    pub fn duration(&self, cycle: usize) -> f64 {
        self.ipsilateral_times[cycle].duration()
    }
}

/// Detect heel-strike and toe-off candidates for one leg
///
/// # Arguments
/// * `markers` - Trajectories containing the leg's calcaneus, toe and PSIS markers
/// * `side` - Leg to analyse
/// * `axis` - World axis along which the feet are compared to the pelvis
pub fn detect_event_candidates(
    markers: &MarkerTrajectorySet,
    side: Side,
    axis: usize,
) -> Result<EventCandidates> {
    let calc_rel = markers.relative_axis_signal(&side.calcaneus(), &side.psis(), axis)?;
    let toe_rel = markers.relative_axis_signal(&side.toe(), &side.psis(), axis)?;

    Ok(EventCandidates {
        heel_strikes: PeakDetector::maxima().find_all_peaks(&calc_rel),
        toe_offs: PeakDetector::minima().find_all_peaks(&toe_rel),
    })
}

/// Resolve `LegSelection::Auto` to the leg whose last heel-strike is latest
///
/// Ties go to the left leg.
pub fn resolve_leg(leg: LegSelection, right: &EventCandidates, left: &EventCandidates) -> Side {
    match leg {
        LegSelection::Left => Side::Left,
        LegSelection::Right => Side::Right,
        LegSelection::Auto => match (right.heel_strikes.last(), left.heel_strikes.last()) {
            (Some(r), Some(l)) if r > l => Side::Right,
            (Some(_), None) => Side::Right,
            _ => Side::Left,
        },
    }
}

/// Segment a trial into gait cycles
///
/// Up to `n_gait_cycles` cycles are returned, most recent first. Fewer are
/// returned when the ipsilateral leg has fewer complete heel-strike pairs,
/// or when an older cycle has no ipsilateral toe-off: cycles stop at the
/// first such gap.
///
/// # Errors
/// * `GaitError::InsufficientGaitCycles` if not even one cycle exists or
///   zero cycles are requested
/// * `GaitError::MissingToeOff` if the most recent cycle has no ipsilateral toe-off
/// * `GaitError::MissingMarker` if a foot or PSIS marker is absent
/// * `GaitError::Config` if the heading axis is not 0, 1 or 2
pub fn segment_walking(
    markers: &MarkerTrajectorySet,
    n_gait_cycles: usize,
    leg: LegSelection,
    config: &EventConfig,
) -> Result<GaitEventTable> {
    let right = detect_event_candidates(markers, Side::Right, config.heading_axis)?;
    let left = detect_event_candidates(markers, Side::Left, config.heading_axis)?;
    log::debug!(
        "Detected events: right HS={} TO={}, left HS={} TO={}",
        right.heel_strikes.len(),
        right.toe_offs.len(),
        left.heel_strikes.len(),
        left.toe_offs.len()
    );

    let ipsilateral_leg = resolve_leg(leg, &right, &left);
    let (ips, cont) = match ipsilateral_leg {
        Side::Right => (&right, &left),
        Side::Left => (&left, &right),
    };
    log::debug!("Ipsilateral leg: {}", ipsilateral_leg);

    let hs_ips = &ips.heel_strikes;
    let available = hs_ips.len().saturating_sub(1);
    let n_cycles = n_gait_cycles.min(available);
    if n_cycles < 1 {
        return Err(GaitError::InsufficientGaitCycles {
            detected_heel_strikes: hs_ips.len(),
        });
    }
    if n_cycles < n_gait_cycles {
        log::warn!(
            "Requested {} gait cycles, only {} available on the {} leg",
            n_gait_cycles,
            n_cycles,
            ipsilateral_leg
        );
    }

    let time = markers.time();
    let mut table = GaitEventTable {
        ipsilateral_leg,
        ipsilateral: Vec::with_capacity(n_cycles),
        contralateral: Vec::with_capacity(n_cycles),
        ipsilateral_times: Vec::with_capacity(n_cycles),
        contralateral_times: Vec::with_capacity(n_cycles),
    };

    for i in 0..n_cycles {
        let heel_strike = hs_ips[hs_ips.len() - 2 - i];
        let next_heel_strike = hs_ips[hs_ips.len() - 1 - i];

        let Some(toe_off) = find_last_between(&ips.toe_offs, heel_strike, next_heel_strike) else {
            if i == 0 {
                return Err(GaitError::MissingToeOff { cycle: 0 });
            }
            log::warn!(
                "No {} toe-off between heel-strikes {} and {}; keeping the {} most recent cycle(s)",
                ipsilateral_leg,
                heel_strike,
                next_heel_strike,
                i
            );
            break;
        };
        let cycle = IpsilateralCycle {
            heel_strike,
            toe_off,
            next_heel_strike,
        };

        let cont_toe_off = find_last_between(&cont.toe_offs, heel_strike, next_heel_strike);
        let cont_heel_strike = find_last_between(&cont.heel_strikes, heel_strike, next_heel_strike);
        let contralateral = match (cont_toe_off, cont_heel_strike) {
            (Some(toe_off), Some(heel_strike)) => Some(ContralateralEvents {
                toe_off,
                heel_strike,
            }),
            _ => {
                log::warn!(
                    "Could not find contralateral gait event within ipsilateral cycle {} ({}..{})",
                    i,
                    heel_strike,
                    next_heel_strike
                );
                None
            }
        };

        log::debug!(
            "Cycle {}: {:?} at {:?}, contralateral {:?} at {:?}",
            i,
            IPSILATERAL_EVENT_NAMES,
            cycle.indices(),
            CONTRALATERAL_EVENT_NAMES,
            contralateral.map(|c| [c.toe_off, c.heel_strike])
        );

        table.ipsilateral_times.push(CycleTimes {
            heel_strike: time[cycle.heel_strike],
            toe_off: time[cycle.toe_off],
            next_heel_strike: time[cycle.next_heel_strike],
        });
        table
            .contralateral_times
            .push(contralateral.map(|c| ContralateralTimes {
                toe_off: time[c.toe_off],
                heel_strike: time[c.heel_strike],
            }));
        table.ipsilateral.push(cycle);
        table.contralateral.push(contralateral);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::markers_with_events;

    // Right HS every 100 samples from 50, TO 60 samples later; left offset by half a cycle
    fn regular_walk() -> MarkerTrajectorySet {
        markers_with_events(
            500,
            &[50, 150, 250, 350, 450],
            &[10, 110, 210, 310, 410],
            &[100, 200, 300, 400],
            &[60, 160, 260, 360, 460],
        )
    }

    #[test]
    fn test_detect_candidates() {
        let markers = regular_walk();
        let right = detect_event_candidates(&markers, Side::Right, 0).unwrap();
        assert_eq!(right.heel_strikes, vec![50, 150, 250, 350, 450]);
        assert_eq!(right.toe_offs, vec![10, 110, 210, 310, 410]);
    }

    #[test]
    fn test_auto_leg_picks_latest_heel_strike() {
        let markers = regular_walk();
        let table = segment_walking(&markers, 1, LegSelection::Auto, &EventConfig::default()).unwrap();
        assert_eq!(table.ipsilateral_leg, Side::Right);
        assert_eq!(
            table.ipsilateral[0],
            IpsilateralCycle {
                heel_strike: 350,
                toe_off: 410,
                next_heel_strike: 450
            }
        );
        assert_eq!(
            table.contralateral[0],
            Some(ContralateralEvents {
                toe_off: 360,
                heel_strike: 400
            })
        );
    }

    #[test]
    fn test_cycles_most_recent_first() {
        let markers = regular_walk();
        let table = segment_walking(&markers, 3, LegSelection::Right, &EventConfig::default()).unwrap();
        assert_eq!(table.cycle_count(), 3);
        let starts: Vec<usize> = table.ipsilateral.iter().map(|c| c.heel_strike).collect();
        assert_eq!(starts, vec![350, 250, 150]);

        for (cycle, cont) in table.ipsilateral.iter().zip(&table.contralateral) {
            assert!(cycle.heel_strike < cycle.toe_off && cycle.toe_off < cycle.next_heel_strike);
            let cont = cont.expect("regular walk has complete cycles");
            assert!(cont.toe_off > cycle.heel_strike && cont.toe_off < cycle.next_heel_strike);
            assert!(cont.heel_strike > cycle.heel_strike && cont.heel_strike < cycle.next_heel_strike);
        }
    }

    #[test]
    fn test_cycle_count_clamped_to_available() {
        let markers = regular_walk();
        let table = segment_walking(&markers, 10, LegSelection::Left, &EventConfig::default()).unwrap();
        assert_eq!(table.ipsilateral_leg, Side::Left);
        assert_eq!(table.cycle_count(), 3);
        assert_eq!(table.contralateral.len(), 3);
        assert_eq!(table.ipsilateral_times.len(), 3);
    }

    #[test]
    fn test_times_follow_indices() {
        let markers = regular_walk();
        let table = segment_walking(&markers, 1, LegSelection::Right, &EventConfig::default()).unwrap();
        let times = table.ipsilateral_times[0];
        assert!((times.heel_strike - 3.5).abs() < 1e-12);
        assert!((times.toe_off - 4.1).abs() < 1e-12);
        assert!((table.duration(0) - 1.0).abs() < 1e-9);
        let cont = table.contralateral_times[0].unwrap();
        assert!((cont.heel_strike - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_cycles() {
        let markers = markers_with_events(200, &[100], &[60], &[50, 150], &[110]);
        let result = segment_walking(&markers, 1, LegSelection::Right, &EventConfig::default());
        assert!(matches!(
            result,
            Err(GaitError::InsufficientGaitCycles {
                detected_heel_strikes: 1
            })
        ));
    }

    #[test]
    fn test_missing_contralateral_degrades_cycle() {
        // No left toe-off between the last two right heel-strikes
        let markers = markers_with_events(
            300,
            &[50, 150, 250],
            &[110, 210],
            &[100, 200],
            &[60],
        );
        let table = segment_walking(&markers, 2, LegSelection::Right, &EventConfig::default()).unwrap();
        assert_eq!(table.cycle_count(), 2);
        assert!(!table.is_complete(0));
        assert!(table.contralateral_times[0].is_none());
        assert!(table.is_complete(1));
        assert_eq!(table.ipsilateral[0].toe_off, 210);
    }

    #[test]
    fn test_missing_ipsilateral_toe_off() {
        let markers = markers_with_events(300, &[50, 150, 250], &[110], &[100, 200], &[60, 160]);
        let result = segment_walking(&markers, 1, LegSelection::Right, &EventConfig::default());
        assert!(matches!(result, Err(GaitError::MissingToeOff { cycle: 0 })));
    }

    #[test]
    fn test_missing_toe_off_in_older_cycle_truncates() {
        let markers = markers_with_events(
            400,
            &[50, 150, 250, 350],
            &[210, 310],
            &[100, 200, 300],
            &[60, 160, 260],
        );
        let table = segment_walking(&markers, 3, LegSelection::Right, &EventConfig::default()).unwrap();
        assert_eq!(table.cycle_count(), 2);
        assert_eq!(table.contralateral.len(), 2);
        assert_eq!(table.ipsilateral_times.len(), 2);
        let starts: Vec<usize> = table.ipsilateral.iter().map(|c| c.heel_strike).collect();
        assert_eq!(starts, vec![250, 150]);

        let one = segment_walking(&markers, 1, LegSelection::Right, &EventConfig::default()).unwrap();
        assert_eq!(one.ipsilateral[0], table.ipsilateral[0]);
    }

    #[test]
    fn test_zero_cycles_rejected() {
        let markers = regular_walk();
        assert!(matches!(
            segment_walking(&markers, 0, LegSelection::Auto, &EventConfig::default()),
            Err(GaitError::InsufficientGaitCycles {
                detected_heel_strikes: 5
            })
        ));
    }

    #[test]
    fn test_heading_axis_out_of_range() {
        let markers = regular_walk();
        let config = EventConfig { heading_axis: 3 };
        assert!(matches!(
            segment_walking(&markers, 1, LegSelection::Right, &config),
            Err(GaitError::Config(_))
        ));
    }

    #[test]
    fn test_segments_along_z_heading() {
        // Same walk with world x and z swapped
        let (time, mut raw) = regular_walk().into_parts();
        for points in raw.values_mut() {
            for p in points.iter_mut() {
                p.swap_rows(0, 2);
            }
        }
        let swapped = MarkerTrajectorySet::new(time, raw).unwrap();
        let config = EventConfig { heading_axis: 2 };

        let table = segment_walking(&swapped, 3, LegSelection::Auto, &config).unwrap();
        let expected = segment_walking(&regular_walk(), 3, LegSelection::Auto, &EventConfig::default()).unwrap();
        assert_eq!(table.ipsilateral_leg, Side::Right);
        assert_eq!(table.ipsilateral, expected.ipsilateral);
        assert_eq!(table.contralateral, expected.contralateral);

        // Along x the swapped markers carry no foot motion
        assert!(segment_walking(&swapped, 1, LegSelection::Right, &EventConfig::default()).is_err());
    }

    #[test]
    fn test_deterministic() {
        let markers = regular_walk();
        let a = segment_walking(&markers, 2, LegSelection::Auto, &EventConfig::default()).unwrap();
        let b = segment_walking(&markers, 2, LegSelection::Auto, &EventConfig::default()).unwrap();
        assert_eq!(a.ipsilateral, b.ipsilateral);
        assert_eq!(a.contralateral, b.contralateral);
    }
}
