use thiserror::Error;

#[derive(Error, Debug)]
pub enum GaitError {
    #[error("Insufficient data: need {needed} samples, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error(
        "Not enough gait cycles found: {detected_heel_strikes} heel-strike(s) detected on the ipsilateral leg"
    )]
    InsufficientGaitCycles { detected_heel_strikes: usize },

    #[error("No ipsilateral toe-off found between the heel-strikes of cycle {cycle}")]
    MissingToeOff { cycle: usize },

    #[error("Marker '{0}' not found in trajectory set")]
    MissingMarker(String),

    #[error("Unknown scalar(s) {requested:?}; available scalars are: {}", available.join(", "))]
    UnknownScalar {
        requested: Vec<String>,
        available: Vec<&'static str>,
    },

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid time base: {0}")]
    InvalidTimeBase(String),

    #[error("Cannot build gait frame for cycle {cycle}: degenerate {axis} axis")]
    DegenerateFrame { cycle: usize, axis: &'static str },

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse trial data: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GaitError>;
