mod noise;
mod walking;

pub use noise::{MarkerNoiseConfig, apply_marker_noise};
pub use walking::{SyntheticTrial, WalkingTrialConfig, generate_walking_trial};
