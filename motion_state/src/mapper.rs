//! Motion sample → UI state mapping.
//!
//! Three mappings are applied to each arriving [`MotionSample`]:
//!
//! | Mapping | Output | Consumer |
//! |---|---|---|
//! | [`format_snapshot`] | multi-line text report | text view |
//! | [`orientation_to_rotation`] | `(-pitch, -yaw, -roll)` | head model node |
//! | [`evaluate_page_change`] | [`PageChangeDecision`] | feed pager |
//!
//! The first two are pure.  The page decision is debounced through a
//! [`PageDebounceState`]: once a change fires, further changes are suppressed
//! for [`PAGE_CHANGE_DEBOUNCE`].

use std::time::{Duration, Instant};

use crate::sample::{MotionSample, Vector3};

// ════════════════════════════════════════════════════════════════════════════
// Policy constants
// ════════════════════════════════════════════════════════════════════════════

/// Radians → degrees.
pub const DEGREES_PER_RADIAN: f64 = 180.0 / std::f64::consts::PI;

/// Head pitch, in degrees, beyond which a page change is requested.
/// Above `+threshold` advances, below `-threshold` retreats.
pub const PAGE_TILT_THRESHOLD_DEGREES: f64 = 10.0;

/// Window after a page change during which no further change may fire.
pub const PAGE_CHANGE_DEBOUNCE: Duration = Duration::from_secs(1);

/// Report shown when a tick carries no sample.
pub const NO_DATA_TEXT: &str = "Device motion is empty.";

// ════════════════════════════════════════════════════════════════════════════
// Snapshot text
// ════════════════════════════════════════════════════════════════════════════

/// Render a fixed-order, human-readable report of one sample.
///
/// Attitude and rotation rate are converted to degrees; gravity, user
/// acceleration, magnetic field, heading and sensor location are printed in
/// their native units.  `None` yields [`NO_DATA_TEXT`].
pub fn format_snapshot(sample: Option<&MotionSample>) -> String {
    let s = match sample {
        Some(s) => s,
        None    => return NO_DATA_TEXT.to_string(),
    };

    let att = &s.attitude;
    let rate = s.rotation_rate.scaled(DEGREES_PER_RADIAN);
    let field = s.magnetic_field.field;
    let heading = match s.heading {
        Some(h) => format!("{:?}", h),
        None    => "n/a".to_string(),
    };

    let mut out = String::with_capacity(512);
    out.push_str(&format!(
        "Attitude:\n    pitch: {:?}\n    roll: {:?}\n    yaw: {:?}\n",
        att.pitch * DEGREES_PER_RADIAN,
        att.roll  * DEGREES_PER_RADIAN,
        att.yaw   * DEGREES_PER_RADIAN,
    ));
    out.push_str(&vector_section("Rotation Rate", rate));
    out.push_str(&vector_section("Gravitational Acceleration", s.gravity));
    out.push_str(&vector_section("User Acceleration", s.user_acceleration));
    out.push_str(&format!(
        "Magnetic Field:\n    field: (x: {:?}, y: {:?}, z: {:?})\n    accuracy: {}\n",
        field.x, field.y, field.z,
        s.magnetic_field.accuracy.name(),
    ));
    out.push_str(&format!("Heading:\n    {}\n", heading));
    out.push_str(&format!("Sensor Location:\n    {}", s.sensor_location.raw_value()));
    out
}

fn vector_section(title: &str, v: Vector3) -> String {
    format!("{}:\n    x: {:?}\n    y: {:?}\n    z: {:?}\n", title, v.x, v.y, v.z)
}

// ════════════════════════════════════════════════════════════════════════════
// Model rotation
// ════════════════════════════════════════════════════════════════════════════

/// Euler rotation (radians) to apply to the head model node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeRotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<NodeRotation> for (f64, f64, f64) {
    fn from(r: NodeRotation) -> Self { (r.x, r.y, r.z) }
}

/// Map sensor attitude onto the model's mirrored axes: `(-pitch, -yaw, -roll)`.
pub fn orientation_to_rotation(sample: &MotionSample) -> NodeRotation {
    let a = &sample.attitude;
    NodeRotation { x: -a.pitch, y: -a.yaw, z: -a.roll }
}

// ════════════════════════════════════════════════════════════════════════════
// Page change decision
// ════════════════════════════════════════════════════════════════════════════

/// What the feed pager should do in response to one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageChangeDecision {
    NoChange,
    /// Head tilted up: move to the given (next) index.
    Advance(usize),
    /// Head tilted down: move to the given (previous) index.
    Retreat(usize),
}

impl PageChangeDecision {
    pub fn is_change(self) -> bool { self != PageChangeDecision::NoChange }

    /// The index this decision navigates to, if any.
    pub fn target(self) -> Option<usize> {
        match self {
            PageChangeDecision::NoChange   => None,
            PageChangeDecision::Advance(i) |
            PageChangeDecision::Retreat(i) => Some(i),
        }
    }
}

/// Debounce flag guarding page changes.
///
/// `Free` until a change fires; then `Suppressed` until `expiry`.  The owner
/// schedules [`release`](Self::release) for the expiry instant, but a stale
/// suppression past its expiry never blocks a change on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageDebounceState {
    change_suppressed: bool,
    expiry:            Option<Instant>,
}

impl PageDebounceState {
    pub fn new() -> Self { Self::default() }

    pub fn change_suppressed(&self) -> bool { self.change_suppressed }
    pub fn expiry(&self)            -> Option<Instant> { self.expiry }

    /// True while a change fired less than the debounce window ago.
    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.change_suppressed && self.expiry.map_or(false, |e| now < e)
    }

    fn suppress(&mut self, now: Instant) {
        self.change_suppressed = true;
        self.expiry = Some(now + PAGE_CHANGE_DEBOUNCE);
    }

    /// Return to `Free`.  Called by the deferred re-enable timer.
    pub fn release(&mut self) {
        self.change_suppressed = false;
        self.expiry = None;
    }
}

/// Decide whether the head tilt in `sample` should change the visible page.
///
/// Pitch beyond `+PAGE_TILT_THRESHOLD_DEGREES` advances, beyond the negative
/// threshold retreats.  Advancing is clamped to the last item and retreating
/// to the first.  A change puts `state` into suppression for
/// [`PAGE_CHANGE_DEBOUNCE`]; while suppressed every call returns `NoChange`
/// and leaves `state` untouched.
pub fn evaluate_page_change(
    sample:        &MotionSample,
    state:         &mut PageDebounceState,
    current_index: usize,
    item_count:    usize,
    now:           Instant,
) -> PageChangeDecision {
    if state.is_suppressed(now) {
        return PageChangeDecision::NoChange;
    }

    let pitch = sample.attitude.pitch * DEGREES_PER_RADIAN;

    let decision = if pitch > PAGE_TILT_THRESHOLD_DEGREES {
        if current_index < item_count.saturating_sub(1) {
            PageChangeDecision::Advance(current_index + 1)
        } else {
            PageChangeDecision::NoChange
        }
    } else if pitch < -PAGE_TILT_THRESHOLD_DEGREES {
        if current_index > 0 {
            PageChangeDecision::Retreat(current_index - 1)
        } else {
            PageChangeDecision::NoChange
        }
    } else {
        PageChangeDecision::NoChange
    };

    if decision.is_change() {
        state.suppress(now);
    }
    decision
}

// ════════════════════════════════════════════════════════════════════════════
// MotionStateMapper
// ════════════════════════════════════════════════════════════════════════════

/// Owns the page debounce state and applies the three mappings.
///
/// Not meant to be shared between threads: samples must be delivered to it
/// one at a time from a single loop.
#[derive(Debug, Default)]
pub struct MotionStateMapper {
    debounce: PageDebounceState,
}

impl MotionStateMapper {
    pub fn new() -> Self { Self::default() }

    pub fn snapshot(&self, sample: Option<&MotionSample>) -> String {
        format_snapshot(sample)
    }

    pub fn rotation(&self, sample: &MotionSample) -> NodeRotation {
        orientation_to_rotation(sample)
    }

    pub fn page_change(
        &mut self,
        sample:        &MotionSample,
        current_index: usize,
        item_count:    usize,
        now:           Instant,
    ) -> PageChangeDecision {
        evaluate_page_change(sample, &mut self.debounce, current_index, item_count, now)
    }

    pub fn debounce(&self)                   -> &PageDebounceState { &self.debounce }
    pub fn debounce_expiry(&self)            -> Option<Instant>    { self.debounce.expiry() }
    pub fn is_page_change_suppressed(&self, now: Instant) -> bool  { self.debounce.is_suppressed(now) }
    pub fn release_page_change(&mut self)                          { self.debounce.release(); }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
