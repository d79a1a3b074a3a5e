//! # motion_state
//!
//! Maps headphone motion samples onto UI state.
//!
//! * [`format_snapshot`] — text report, angles in degrees
//! * [`orientation_to_rotation`] — Euler rotation for a mirrored head model
//! * [`evaluate_page_change`] — head-tilt paging, debounced to one change per
//!   [`PAGE_CHANGE_DEBOUNCE`]
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use motion_state::{Attitude, MotionSample, MotionStateMapper, PageChangeDecision};
//!
//! let mut mapper = MotionStateMapper::new();
//! let nod_up = MotionSample::from_attitude(Attitude::new(0.3, 0.0, 0.0));
//!
//! let now = Instant::now();
//! assert_eq!(mapper.page_change(&nod_up, 0, 6, now), PageChangeDecision::Advance(1));
//! // Suppressed for the next second.
//! assert_eq!(mapper.page_change(&nod_up, 1, 6, now), PageChangeDecision::NoChange);
//! ```
//!
//! No I/O happens here; sources, sinks and scheduling live in `head_motion`.

pub mod sample;
pub mod mapper;

pub use sample::{
    Attitude, CalibratedMagneticField, CalibrationAccuracy, MotionSample, SensorLocation, Vector3,
};
pub use mapper::{
    evaluate_page_change, format_snapshot, orientation_to_rotation, MotionStateMapper,
    NodeRotation, PageChangeDecision, PageDebounceState, DEGREES_PER_RADIAN, NO_DATA_TEXT,
    PAGE_CHANGE_DEBOUNCE, PAGE_TILT_THRESHOLD_DEGREES,
};
