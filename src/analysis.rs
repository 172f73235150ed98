//! Per-trial gait analysis.
//!
//! [`GaitAnalysis`] segments a trial once at construction and keeps the
//! derived event table, treadmill estimate and gait frames. Scalar metrics
//! and time-normalized coordinates are computed on demand from that
//! immutable state.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::error::{GaitError, Result};
use crate::gait::{
    GaitEventTable, GaitFrame, ScalarContext, ScalarValue, TimeNormalizedCoordinates,
    TreadmillEstimate, compute_gait_frames, estimate_treadmill_speed, scalars, segment_walking,
    time_normalize,
};
use crate::kinematics::{CenterOfMass, CoordinateTable, KinematicsProvider, TrialKinematics};
use crate::loader;
use crate::markers::MarkerTrajectorySet;

pub struct GaitAnalysis<K: KinematicsProvider> {
    markers: MarkerTrajectorySet,
    kinematics: K,
    coordinates: CoordinateTable,
    events: GaitEventTable,
    treadmill: TreadmillEstimate,
    center_of_mass: CenterOfMass,
    frames: Vec<GaitFrame>,
    normalization_points: usize,
}

impl<K: KinematicsProvider> GaitAnalysis<K> {
    /// Analyse one trial
    ///
    /// Markers are low-pass filtered first when `config.filter` has a
    /// positive cutoff. The kinematics provider is used as given.
    ///
    /// # Errors
    /// * `GaitError::Config` for an invalid configuration
    /// * `GaitError::LengthMismatch` if markers and kinematics disagree in length
    /// * Segmentation, treadmill and frame errors, e.g.
    ///   `GaitError::InsufficientGaitCycles` or `GaitError::MissingMarker`
    pub fn new(markers: MarkerTrajectorySet, kinematics: K, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        check_length("kinematics time", markers.len(), kinematics.time().len())?;

        let markers = if config.filtering_enabled() {
            markers.low_pass_filtered(config.filter.cutoff_hz, config.filter.order)?
        } else {
            markers
        };

        let coordinates = kinematics.coordinate_values()?;
        if coordinates.column_count() > 0 {
            check_length("coordinate values", markers.len(), coordinates.row_count())?;
        }

        let events = segment_walking(&markers, config.gait_cycles, config.leg, &config.events)?;
        let treadmill = estimate_treadmill_speed(&markers, &events, &config.treadmill)?;

        let center_of_mass = kinematics.center_of_mass_values()?;
        check_length("center of mass", markers.len(), center_of_mass.len())?;

        let frames = compute_gait_frames(&markers, &events, treadmill.locomotion)?;

        log::info!(
            "Segmented {} {} cycle(s), treadmill speed {:.3}",
            events.cycle_count(),
            events.ipsilateral_leg,
            treadmill.speed()
        );

        Ok(Self {
            markers,
            kinematics,
            coordinates,
            events,
            treadmill,
            center_of_mass,
            frames,
            normalization_points: config.normalization.points,
        })
    }

    fn scalar_context(&self) -> ScalarContext<'_> {
        ScalarContext {
            markers: &self.markers,
            events: &self.events,
            frames: &self.frames,
            treadmill: &self.treadmill,
            center_of_mass: &self.center_of_mass,
        }
    }

    /// Trial means of the named scalars
    ///
    /// `None` logs the available scalar names at `warn` and returns an
    /// empty map; [`Self::available_scalars`] returns them instead.
    pub fn compute_scalars(&self, names: Option<&[&str]>) -> Result<BTreeMap<String, f64>> {
        scalars::compute_scalars(&self.scalar_context(), names)
    }

    /// One scalar with its per-cycle values
    pub fn compute_scalar(&self, name: &str) -> Result<ScalarValue> {
        scalars::compute_scalar(&self.scalar_context(), name)
    }

    pub fn available_scalars(&self) -> Vec<&'static str> {
        scalars::available_scalars()
    }

    /// Coordinates resampled to percent of gait cycle, per cycle and averaged
    pub fn coordinates_time_normalized(&self) -> Result<TimeNormalizedCoordinates> {
        time_normalize(&self.coordinates, &self.events, self.normalization_points)
    }

    pub fn gait_events(&self) -> &GaitEventTable {
        &self.events
    }

    pub fn cycle_count(&self) -> usize {
        self.events.cycle_count()
    }

    pub fn treadmill(&self) -> &TreadmillEstimate {
        &self.treadmill
    }

    /// Belt speed, zero for overground trials
    pub fn treadmill_speed(&self) -> f64 {
        self.treadmill.speed()
    }

    pub fn is_overground(&self) -> bool {
        self.treadmill.locomotion.is_overground()
    }

    pub fn gait_frames(&self) -> &[GaitFrame] {
        &self.frames
    }

    /// Marker trajectories after filtering
    pub fn markers(&self) -> &MarkerTrajectorySet {
        &self.markers
    }

    pub fn kinematics(&self) -> &K {
        &self.kinematics
    }

    pub fn coordinates(&self) -> &CoordinateTable {
        &self.coordinates
    }

    pub fn center_of_mass(&self) -> &CenterOfMass {
        &self.center_of_mass
    }
}

impl GaitAnalysis<TrialKinematics> {
    /// Load and analyse a trial stored in a session directory
    ///
    /// The filter cutoff applies to both markers and kinematics.
    pub fn from_session(session: &Path, trial: &str, config: &AnalysisConfig) -> Result<Self> {
        let (markers, kinematics) = loader::load_trial(session, trial)?;
        let kinematics = if config.filtering_enabled() {
            kinematics.low_pass_filtered(config.filter.cutoff_hz, config.filter.order)?
        } else {
            kinematics
        };
        Self::new(markers, kinematics, config)
    }
}

fn check_length(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GaitError::LengthMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
