pub mod filters;
pub mod math;
pub mod peak_detector;

pub use filters::{ZeroPhaseLowpass, low_pass_filter};
pub use math::{find_last_between, interp, linspace, mean, mean_sample_interval, round_index};
pub use peak_detector::{PeakDetector, PeakPolarity};
