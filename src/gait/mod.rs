pub mod events;
pub mod frame;
pub mod normalize;
pub mod scalars;
pub mod treadmill;

pub use events::{
    CONTRALATERAL_EVENT_NAMES, ContralateralEvents, ContralateralTimes, CycleTimes, EventCandidates,
    GaitEventTable, IPSILATERAL_EVENT_NAMES, IpsilateralCycle, detect_event_candidates, resolve_leg,
    segment_walking,
};
pub use frame::{GaitFrame, compute_gait_frames};
pub use normalize::{TimeNormalizedCoordinates, time_normalize, time_normalize_cycle};
pub use scalars::{ScalarComputer, ScalarContext, ScalarValue, available_scalars, compute_scalars};
pub use treadmill::{Locomotion, TreadmillEstimate, estimate_treadmill_speed};
