//! Named scalar gait metrics.
//!
//! Every metric is a per-cycle quantity averaged over the cycles of a
//! trial. Metrics are looked up by name in a static registry, so callers
//! can enumerate them without computing anything.

use std::collections::BTreeMap;

use nalgebra::Vector3;
use serde::Serialize;

use crate::error::{GaitError, Result};
use crate::gait::events::GaitEventTable;
use crate::gait::frame::GaitFrame;
use crate::gait::treadmill::TreadmillEstimate;
use crate::kinematics::CenterOfMass;
use crate::markers::{MarkerTrajectorySet, Side};
use crate::signal_processing::mean;

/// Everything a scalar computation may read
pub struct ScalarContext<'a> {
    pub markers: &'a MarkerTrajectorySet,
    pub events: &'a GaitEventTable,
    pub frames: &'a [GaitFrame],
    pub treadmill: &'a TreadmillEstimate,
    pub center_of_mass: &'a CenterOfMass,
}

/// Trial mean of a metric plus its per-cycle values, most recent cycle first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarValue {
    pub mean: f64,
    pub per_cycle: Vec<f64>,
}

impl ScalarValue {
    fn from_cycles(per_cycle: Vec<f64>) -> Self {
        Self {
            mean: mean(&per_cycle),
            per_cycle,
        }
    }
}

/// A named metric and the routine that computes it
pub struct ScalarComputer {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    compute: fn(&ScalarContext) -> Result<ScalarValue>,
}

impl ScalarComputer {
    pub fn compute(&self, ctx: &ScalarContext) -> Result<ScalarValue> {
        (self.compute)(ctx)
    }
}

static SCALAR_REGISTRY: &[ScalarComputer] = &[
    ScalarComputer {
        name: "gait_speed",
        description: "Center-of-mass speed over the cycle plus belt speed",
        unit: "m/s",
        compute: gait_speed,
    },
    ScalarComputer {
        name: "step_width",
        description: "Mediolateral distance between ankle centers at heel-strike",
        unit: "m",
        compute: step_width,
    },
    ScalarComputer {
        name: "stride_length",
        description: "Heel displacement between heel-strikes plus belt travel",
        unit: "m",
        compute: stride_length,
    },
    ScalarComputer {
        name: "treadmill_speed",
        description: "Estimated belt speed, zero when overground",
        unit: "m/s",
        compute: treadmill_speed,
    },
];

/// Every registered metric, in registry order
pub fn registry() -> &'static [ScalarComputer] {
    SCALAR_REGISTRY
}

/// Names of all registered metrics
pub fn available_scalars() -> Vec<&'static str> {
    SCALAR_REGISTRY.iter().map(|c| c.name).collect()
}

/// # Errors
/// Returns `GaitError::UnknownScalar` listing every registered name
pub fn lookup(name: &str) -> Result<&'static ScalarComputer> {
    SCALAR_REGISTRY
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| GaitError::UnknownScalar {
            requested: vec![name.to_string()],
            available: available_scalars(),
        })
}

/// Compute one metric with its per-cycle breakdown
pub fn compute_scalar(ctx: &ScalarContext, name: &str) -> Result<ScalarValue> {
    lookup(name)?.compute(ctx)
}

/// Compute the trial means of the requested metrics
///
/// With `None` no metric is computed: the available names are logged at
/// `warn` and an empty map is returned. Callers that need the names
/// should use [`available_scalars`]. All names are checked before anything
/// is computed, so an unknown name fails without partial work.
///
/// # Errors
/// * `GaitError::UnknownScalar` if any requested name is not registered
/// * Errors of the individual computations, e.g. `GaitError::MissingMarker`
pub fn compute_scalars(ctx: &ScalarContext, names: Option<&[&str]>) -> Result<BTreeMap<String, f64>> {
    let Some(names) = names else {
        log::warn!(
            "No scalars requested; available scalars: {}",
            available_scalars().join(", ")
        );
        return Ok(BTreeMap::new());
    };

    let unknown: Vec<String> = names
        .iter()
        .filter(|name| !SCALAR_REGISTRY.iter().any(|c| c.name == **name))
        .map(|name| name.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(GaitError::UnknownScalar {
            requested: unknown,
            available: available_scalars(),
        });
    }

    let mut scalars = BTreeMap::new();
    for &name in names {
        let value = compute_scalar(ctx, name)?;
        scalars.insert(name.to_string(), value.mean);
    }
    Ok(scalars)
}

fn stride_length(ctx: &ScalarContext) -> Result<ScalarValue> {
    let calc = ctx.markers.marker(&ctx.events.ipsilateral_leg.calcaneus())?;
    let belt = ctx.treadmill.speed();

    let per_cycle = ctx
        .events
        .ipsilateral
        .iter()
        .zip(&ctx.events.ipsilateral_times)
        .map(|(cycle, times)| {
            let displacement = (calc[cycle.next_heel_strike] - calc[cycle.heel_strike]).norm();
            displacement + belt * times.duration()
        })
        .collect();
    Ok(ScalarValue::from_cycles(per_cycle))
}

fn gait_speed(ctx: &ScalarContext) -> Result<ScalarValue> {
    let com = ctx.center_of_mass;
    if com.len() != ctx.markers.len() {
        return Err(GaitError::LengthMismatch {
            what: "center of mass".to_string(),
            expected: ctx.markers.len(),
            actual: com.len(),
        });
    }
    let belt = ctx.treadmill.speed();

    let per_cycle = ctx
        .events
        .ipsilateral
        .iter()
        .zip(&ctx.events.ipsilateral_times)
        .map(|(cycle, times)| {
            let displacement = (com.position(cycle.next_heel_strike) - com.position(cycle.heel_strike)).norm();
            displacement / times.duration() + belt
        })
        .collect();
    Ok(ScalarValue::from_cycles(per_cycle))
}

fn ankle_centers(markers: &MarkerTrajectorySet, side: Side) -> Result<Vec<Vector3<f64>>> {
    markers.midpoint(&side.ankle(), &side.medial_ankle())
}

fn step_width(ctx: &ScalarContext) -> Result<ScalarValue> {
    let ipsilateral = ankle_centers(ctx.markers, ctx.events.ipsilateral_leg)?;
    let contralateral = ankle_centers(ctx.markers, ctx.events.contralateral_leg())?;

    let per_cycle = ctx
        .events
        .ipsilateral
        .iter()
        .zip(&ctx.events.contralateral)
        .zip(ctx.frames)
        .map(|((cycle, cont), frame)| match cont {
            Some(cont) => {
                let step = contralateral[cont.heel_strike] - ipsilateral[cycle.heel_strike];
                frame.to_gait(&step).z.abs()
            }
            // Unavailable, so the trial mean is unavailable too
            None => f64::NAN,
        })
        .collect();
    Ok(ScalarValue::from_cycles(per_cycle))
}

fn treadmill_speed(ctx: &ScalarContext) -> Result<ScalarValue> {
    let speed = ctx.treadmill.speed();
    Ok(ScalarValue {
        mean: speed,
        per_cycle: vec![speed; ctx.events.cycle_count()],
    })
}
