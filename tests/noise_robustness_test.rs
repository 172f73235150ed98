use gaitcycle::config::{AnalysisConfig, EventConfig, LegSelection};
use gaitcycle::gait::segment_walking;
use gaitcycle::simulation::{MarkerNoiseConfig, WalkingTrialConfig, generate_walking_trial};
use gaitcycle::{GaitAnalysis, Side};

fn noisy_walk(std_dev: f64, seed: u64) -> WalkingTrialConfig {
    WalkingTrialConfig {
        noise: Some(MarkerNoiseConfig::new(std_dev).with_seed(seed)),
        ..Default::default()
    }
}

fn filtered_config(cycles: usize) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.filter.cutoff_hz = 6.0;
    config.gait_cycles = cycles;
    config
}

#[test]
fn test_filtered_events_near_truth() {
    let walk = noisy_walk(0.0005, 42);
    let trial = generate_walking_trial(&walk).unwrap();
    let filtered = trial.markers.low_pass_filtered(6.0, 2).unwrap();
    let table = segment_walking(&filtered, 4, LegSelection::Right, &EventConfig::default()).unwrap();

    let truth: Vec<usize> = walk
        .heel_strike_times(Side::Right)
        .iter()
        .map(|t| (t * walk.sample_rate).round() as usize)
        .collect();
    assert_eq!(table.cycle_count(), 4);
    for cycle in &table.ipsilateral {
        let nearest = truth
            .iter()
            .map(|&t| t.abs_diff(cycle.heel_strike))
            .min()
            .unwrap();
        assert!(
            nearest <= 3,
            "Heel-strike {} is {} samples from the nearest true event",
            cycle.heel_strike,
            nearest
        );
    }
    assert!(table.contralateral.iter().all(Option::is_some));
}

#[test]
fn test_filtered_scalars_across_seeds() {
    for seed in [1, 2, 3, 4, 5] {
        let trial = generate_walking_trial(&noisy_walk(0.0005, seed)).unwrap();
        let analysis = GaitAnalysis::new(trial.markers, trial.kinematics, &filtered_config(4)).unwrap();
        assert!(analysis.is_overground(), "Seed {} classified as treadmill", seed);

        let scalars = analysis
            .compute_scalars(Some(&["gait_speed", "stride_length", "step_width", "treadmill_speed"]))
            .unwrap();
        assert!(
            (scalars["gait_speed"] - 1.2).abs() < 0.02,
            "Seed {}: gait speed {}",
            seed,
            scalars["gait_speed"]
        );
        assert!(
            (scalars["stride_length"] - 1.2).abs() < 0.02,
            "Seed {}: stride length {}",
            seed,
            scalars["stride_length"]
        );
        assert!(
            (scalars["step_width"] - 0.16).abs() < 0.005,
            "Seed {}: step width {}",
            seed,
            scalars["step_width"]
        );
        assert_eq!(scalars["treadmill_speed"], 0.0);
    }
}
