//! Time normalization of coordinate trajectories to percent of gait cycle.

use serde::Serialize;

use crate::error::{GaitError, Result};
use crate::gait::events::GaitEventTable;
use crate::kinematics::CoordinateTable;
use crate::signal_processing::{interp, linspace};

/// Coordinates resampled to percent of gait cycle
///
/// Every table has the source table's columns in the source order and one
/// row per percentage point.
#[derive(Debug, Clone, Serialize)]
pub struct TimeNormalizedCoordinates {
    /// Percent of gait cycle for each row, 0 to 100 inclusive
    pub percent: Vec<f64>,
    /// Elementwise mean over all cycles
    pub mean: CoordinateTable,
    /// One table per cycle, most recent cycle first
    pub individual: Vec<CoordinateTable>,
}

/// Resample the rows `[start, end)` of every column onto `points` evenly
/// spaced percentages of the slice
///
/// # Errors
/// Returns `GaitError::InsufficientData` for an empty slice, or when the
/// slice runs past the end of the table
pub fn time_normalize_cycle(
    coordinates: &CoordinateTable,
    start: usize,
    end: usize,
    points: usize,
) -> Result<CoordinateTable> {
    if end <= start || end > coordinates.row_count() {
        return Err(GaitError::InsufficientData {
            needed: end.max(start + 1),
            available: coordinates.row_count(),
        });
    }

    let target = linspace(0.0, 100.0, points);
    let source = linspace(0.0, 100.0, end - start);
    coordinates.map_columns(|column| {
        let slice = &column[start..end];
        Ok(target.iter().map(|&x| interp(x, &source, slice)).collect())
    })
}

/// Resample every gait cycle of a trial and average across cycles
///
/// # Errors
/// * `GaitError::Config` if fewer than two points are requested
/// * `GaitError::InsufficientData` if a cycle lies outside the table
pub fn time_normalize(
    coordinates: &CoordinateTable,
    events: &GaitEventTable,
    points: usize,
) -> Result<TimeNormalizedCoordinates> {
    if points < 2 {
        return Err(GaitError::Config(format!(
            "time normalization needs at least 2 points, got {}",
            points
        )));
    }

    let individual = events
        .ipsilateral
        .iter()
        .map(|cycle| time_normalize_cycle(coordinates, cycle.heel_strike, cycle.next_heel_strike, points))
        .collect::<Result<Vec<_>>>()?;

    let cycles = individual.len() as f64;
    let mean_columns = (0..coordinates.column_count())
        .map(|c| {
            (0..points)
                .map(|row| individual.iter().map(|t| t.columns()[c][row]).sum::<f64>() / cycles)
                .collect()
        })
        .collect();
    let mean = CoordinateTable::new(coordinates.names().to_vec(), mean_columns)?;

    log::debug!(
        "Time-normalized {} coordinates over {} cycles",
        coordinates.column_count(),
        individual.len()
    );

    Ok(TimeNormalizedCoordinates {
        percent: linspace(0.0, 100.0, points),
        mean,
        individual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gait::events::IpsilateralCycle;
    use crate::markers::Side;
    use approx::assert_abs_diff_eq;

    fn table() -> CoordinateTable {
        CoordinateTable::new(
            vec!["ramp".to_string(), "constant".to_string()],
            vec![
                (0..300).map(|i| i as f64 * 0.5).collect(),
                vec![12.5; 300],
            ],
        )
        .unwrap()
    }

    fn events(cycles: &[(usize, usize, usize)]) -> GaitEventTable {
        GaitEventTable {
            ipsilateral_leg: Side::Right,
            ipsilateral: cycles
                .iter()
                .map(|&(heel_strike, toe_off, next_heel_strike)| IpsilateralCycle {
                    heel_strike,
                    toe_off,
                    next_heel_strike,
                })
                .collect(),
            contralateral: vec![None; cycles.len()],
            ipsilateral_times: vec![],
            contralateral_times: vec![],
        }
    }

    #[test]
    fn test_endpoints_preserved() {
        let table = table();
        let normalized = time_normalize_cycle(&table, 40, 137, 101).unwrap();
        assert_eq!(normalized.row_count(), 101);
        let ramp = normalized.column("ramp").unwrap();
        assert_eq!(ramp[0], 20.0);
        assert_eq!(ramp[100], 136.0 * 0.5);
    }

    #[test]
    fn test_constant_column_stays_constant() {
        let normalized = time_normalize_cycle(&table(), 10, 73, 101).unwrap();
        assert!(normalized.column("constant").unwrap().iter().all(|&v| v == 12.5));
    }

    #[test]
    fn test_linear_column_resampled_linearly() {
        let normalized = time_normalize_cycle(&table(), 0, 101, 101).unwrap();
        for (i, v) in normalized.column("ramp").unwrap().iter().enumerate() {
            assert_abs_diff_eq!(*v, i as f64 * 0.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_sample_cycle_is_constant() {
        let normalized = time_normalize_cycle(&table(), 7, 8, 11).unwrap();
        assert!(normalized.column("ramp").unwrap().iter().all(|&v| v == 3.5));
    }

    #[test]
    fn test_mean_over_cycles_keeps_columns() {
        let table = table();
        let result = time_normalize(&table, &events(&[(100, 160, 200), (0, 60, 100)]), 101).unwrap();

        assert_eq!(result.individual.len(), 2);
        assert_eq!(result.mean.names(), table.names());
        assert_eq!(result.percent.len(), 101);
        for t in &result.individual {
            assert_eq!(t.names(), table.names());
        }

        // Ramp starts at 50 and 0, ends at 99.5 and 49.5
        let ramp = result.mean.column("ramp").unwrap();
        assert_abs_diff_eq!(ramp[0], 25.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ramp[100], 74.5, epsilon = 1e-12);
        assert!(result.mean.column("constant").unwrap().iter().all(|&v| (v - 12.5).abs() < 1e-12));
    }

    #[test]
    fn test_cycle_beyond_table_rejected() {
        let result = time_normalize(&table(), &events(&[(250, 300, 350)]), 101);
        assert!(matches!(result, Err(GaitError::InsufficientData { .. })));
    }

    #[test]
    fn test_too_few_points_rejected() {
        assert!(time_normalize(&table(), &events(&[(0, 60, 100)]), 1).is_err());
    }
}
