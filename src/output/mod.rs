mod csv;
mod json;
mod text;

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::analysis::GaitAnalysis;
use crate::error::Result;
use crate::gait::{Locomotion, ScalarValue};
use crate::kinematics::KinematicsProvider;
use crate::markers::Side;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Scalar results of one analysed trial
#[derive(Debug, Clone, Serialize)]
pub struct TrialReport {
    pub ts: String,
    pub trial: String,
    pub leg: Side,
    pub cycles: usize,
    pub locomotion: Locomotion,
    pub scalars: BTreeMap<String, ScalarValue>,
}

impl TrialReport {
    /// Compute the named scalars of an analysed trial
    pub fn new<K: KinematicsProvider>(trial: &str, analysis: &GaitAnalysis<K>, names: &[&str]) -> Result<Self> {
        let mut scalars = BTreeMap::new();
        for &name in names {
            scalars.insert(name.to_string(), analysis.compute_scalar(name)?);
        }
        Ok(Self {
            ts: iso8601_timestamp(),
            trial: trial.to_string(),
            leg: analysis.gait_events().ipsilateral_leg,
            cycles: analysis.cycle_count(),
            locomotion: analysis.treadmill().locomotion,
            scalars,
        })
    }
}

pub trait Formatter: Send {
    fn format(&self, report: &TrialReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
pub(crate) fn sample_report() -> TrialReport {
    let mut scalars = BTreeMap::new();
    scalars.insert(
        "gait_speed".to_string(),
        ScalarValue {
            mean: 1.25,
            per_cycle: vec![1.2, 1.3],
        },
    );
    scalars.insert(
        "step_width".to_string(),
        ScalarValue {
            mean: f64::NAN,
            per_cycle: vec![f64::NAN, 0.11],
        },
    );
    TrialReport {
        ts: "2026-01-02T03:04:05.000Z".to_string(),
        trial: "walk_1".to_string(),
        leg: Side::Right,
        cycles: 2,
        locomotion: Locomotion::Overground,
        scalars,
    }
}
