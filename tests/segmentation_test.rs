use approx::assert_abs_diff_eq;
use gaitcycle::config::{EventConfig, LegSelection};
use gaitcycle::gait::{
    GaitEventTable, Locomotion, available_scalars, compute_gait_frames, detect_event_candidates,
    segment_walking, time_normalize,
};
use gaitcycle::simulation::{WalkingTrialConfig, generate_walking_trial};
use gaitcycle::{AnalysisConfig, GaitAnalysis, GaitError, Side};

fn walking_variants() -> Vec<WalkingTrialConfig> {
    let mut variants = Vec::new();
    for cycle_period_secs in [0.9, 1.0, 1.2] {
        for duty_factor in [0.58, 0.62] {
            for first_heel_strike_secs in [0.25, 0.5] {
                variants.push(WalkingTrialConfig {
                    duration_secs: 7.0,
                    cycle_period_secs,
                    duty_factor,
                    first_heel_strike_secs,
                    ..Default::default()
                });
            }
        }
    }
    variants
}

fn check_event_table(table: &GaitEventTable, requested: usize, detected_heel_strikes: usize) {
    let n = table.cycle_count();
    assert!(n >= 1);
    assert_eq!(table.contralateral.len(), n);
    assert_eq!(table.ipsilateral_times.len(), n);
    assert_eq!(table.contralateral_times.len(), n);
    assert!(n <= requested, "{} cycles for {} requested", n, requested);
    assert!(n < detected_heel_strikes);

    for (i, (cycle, cont)) in table.ipsilateral.iter().zip(&table.contralateral).enumerate() {
        assert!(
            cycle.heel_strike < cycle.toe_off && cycle.toe_off < cycle.next_heel_strike,
            "Cycle {} out of order: {:?}",
            i,
            cycle
        );
        if let Some(cont) = cont {
            for index in [cont.toe_off, cont.heel_strike] {
                assert!(index > cycle.heel_strike && index < cycle.next_heel_strike);
            }
        }
        if i > 0 {
            // Most recent first, no overlap
            assert_eq!(cycle.next_heel_strike, table.ipsilateral[i - 1].heel_strike);
        }
    }
}

#[test]
fn test_cycle_count_and_ordering_properties() {
    for walk in walking_variants() {
        let trial = generate_walking_trial(&walk).unwrap();
        for leg in [LegSelection::Auto, LegSelection::Left, LegSelection::Right] {
            for requested in [1, 3, 20] {
                let table = segment_walking(&trial.markers, requested, leg, &EventConfig::default()).unwrap();
                let detected = detect_event_candidates(&trial.markers, table.ipsilateral_leg, 0)
                    .unwrap()
                    .heel_strikes
                    .len();
                check_event_table(&table, requested, detected);
                assert!(table.contralateral.iter().all(Option::is_some));
            }
        }
    }
}

#[test]
fn test_detected_events_match_simulated_times() {
    let walk = WalkingTrialConfig::default();
    let trial = generate_walking_trial(&walk).unwrap();
    let to_samples = |times: Vec<f64>| -> Vec<usize> {
        times
            .iter()
            .map(|t| (t * walk.sample_rate).round() as usize)
            .filter(|&i| i > 0 && i + 1 < walk.sample_count())
            .collect()
    };

    for side in [Side::Left, Side::Right] {
        let detected = detect_event_candidates(&trial.markers, side, 0).unwrap();
        assert_eq!(detected.heel_strikes, to_samples(walk.heel_strike_times(side)));
        assert_eq!(detected.toe_offs, to_samples(walk.toe_off_times(side)));
    }
}

#[test]
fn test_auto_leg_is_latest_heel_strike() {
    // Right heel-strikes at 0.5 + k, left at 1.0 + k; 6 s ends on a right stride
    let trial = generate_walking_trial(&WalkingTrialConfig::default()).unwrap();
    let table = segment_walking(&trial.markers, 1, LegSelection::Auto, &EventConfig::default()).unwrap();
    assert_eq!(table.ipsilateral_leg, Side::Right);
    assert_eq!(table.ipsilateral[0].next_heel_strike, 550);

    let trial = generate_walking_trial(&WalkingTrialConfig {
        duration_secs: 5.3,
        ..Default::default()
    })
    .unwrap();
    let table = segment_walking(&trial.markers, 1, LegSelection::Auto, &EventConfig::default()).unwrap();
    assert_eq!(table.ipsilateral_leg, Side::Left);
    assert_eq!(table.ipsilateral[0].next_heel_strike, 500);
}

#[test]
fn test_segmentation_deterministic() {
    let trial = generate_walking_trial(&WalkingTrialConfig::default()).unwrap();
    let a = segment_walking(&trial.markers, 4, LegSelection::Auto, &EventConfig::default()).unwrap();
    let b = segment_walking(&trial.markers, 4, LegSelection::Auto, &EventConfig::default()).unwrap();
    assert_eq!(a.ipsilateral, b.ipsilateral);
    assert_eq!(a.contralateral, b.contralateral);
    assert_eq!(a.ipsilateral_times, b.ipsilateral_times);
}

#[test]
fn test_frames_orthonormal_axes() {
    for walk in walking_variants() {
        let trial = generate_walking_trial(&walk).unwrap();
        let table = segment_walking(&trial.markers, 3, LegSelection::Auto, &EventConfig::default()).unwrap();
        let frames = compute_gait_frames(&trial.markers, &table, Locomotion::Overground).unwrap();
        assert_eq!(frames.len(), table.cycle_count());
        for frame in &frames {
            assert_abs_diff_eq!(frame.heading().norm(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(frame.mediolateral().norm(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(
                frame.vertical(),
                frame.mediolateral().cross(&frame.heading()),
                epsilon = 1e-15
            );
        }
    }
}

#[test]
fn test_time_normalization_boundaries() {
    let trial = generate_walking_trial(&WalkingTrialConfig::default()).unwrap();
    let table = segment_walking(&trial.markers, 3, LegSelection::Right, &EventConfig::default()).unwrap();
    let coordinates = trial.kinematics.coordinates();
    let normalized = time_normalize(coordinates, &table, 101).unwrap();

    for (cycle, resampled) in table.ipsilateral.iter().zip(&normalized.individual) {
        assert_eq!(resampled.names(), coordinates.names());
        for (source, column) in coordinates.columns().iter().zip(resampled.columns()) {
            assert_eq!(column.len(), 101);
            assert_eq!(column[0], source[cycle.heel_strike]);
            assert_eq!(column[100], source[cycle.next_heel_strike - 1]);
        }
        let tilt = resampled.column("pelvis_tilt").unwrap();
        assert!(tilt.iter().all(|&v| v == tilt[0]));
    }
}

#[test]
fn test_unknown_scalar_enumerates_registry() {
    let trial = generate_walking_trial(&WalkingTrialConfig::default()).unwrap();
    let analysis = GaitAnalysis::new(trial.markers, trial.kinematics, &AnalysisConfig::default()).unwrap();

    let err = analysis.compute_scalars(Some(&["gaitSpeed"])).unwrap_err();
    let message = err.to_string();
    for name in available_scalars() {
        assert!(message.contains(name), "'{}' missing from: {}", name, message);
    }
    match err {
        GaitError::UnknownScalar { available, .. } => assert_eq!(available, analysis.available_scalars()),
        other => panic!("Expected unknown scalar error, got {:?}", other),
    }
}
