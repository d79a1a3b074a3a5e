//! The two screens: the motion monitor and the head-tilt feed.
//!
//! A screen receives [`MotionUpdate`]s one at a time from the run loop,
//! applies the `motion_state` mappings and pushes the results into its
//! sinks.  Screens own their mapper (and therefore the debounce state); the
//! loop owns the subscription.

use std::time::Instant;

use motion_state::{MotionSample, MotionStateMapper, DEGREES_PER_RADIAN, NO_DATA_TEXT};
use tracing::{debug, info, warn};

use crate::sink::{NavigationSink, RotationSink, TextSink};
use crate::source::MotionUpdate;
use crate::timer::OneShot;

/// Text shown before the first sample arrives.
pub const WAITING_TEXT: &str = "Waiting...";

// ════════════════════════════════════════════════════════════════════════════
// Screen trait
// ════════════════════════════════════════════════════════════════════════════

pub trait Screen {
    /// Handle one update arriving at `now`.
    fn handle_update(&mut self, update: MotionUpdate, now: Instant);

    /// Run any deferred work that is due.
    fn tick(&mut self, _now: Instant) {}

    /// When `tick` next has work to do, if ever.
    fn next_deadline(&self) -> Option<Instant> { None }
}

fn log_device_event(update: &MotionUpdate) {
    match update {
        MotionUpdate::Connected    => info!("headphone motion connected"),
        MotionUpdate::Disconnected => info!("headphone motion disconnected"),
        MotionUpdate::NoData(why)  => warn!(reason = %why, "{}", NO_DATA_TEXT),
        MotionUpdate::Sample(_)    => {}
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MonitorScreen
// ════════════════════════════════════════════════════════════════════════════

/// Shows a text snapshot of every sample and rotates the head model.
pub struct MonitorScreen<T: TextSink, R: RotationSink> {
    mapper:   MotionStateMapper,
    text:     T,
    rotation: R,
    samples:  u64,
}

impl<T: TextSink, R: RotationSink> MonitorScreen<T, R> {
    pub fn new(mut text: T, rotation: R) -> Self {
        text.show_text(WAITING_TEXT);
        MonitorScreen { mapper: MotionStateMapper::new(), text, rotation, samples: 0 }
    }

    pub fn samples_shown(&self) -> u64 { self.samples }
    pub fn text(&self)     -> &T { &self.text }
    pub fn rotation(&self) -> &R { &self.rotation }

    fn show(&mut self, sample: &MotionSample) {
        let report = self.mapper.snapshot(Some(sample));
        self.text.show_text(&report);
        self.rotation.apply_rotation(self.mapper.rotation(sample));
        self.samples += 1;
    }
}

impl<T: TextSink, R: RotationSink> Screen for MonitorScreen<T, R> {
    fn handle_update(&mut self, update: MotionUpdate, _now: Instant) {
        match update {
            MotionUpdate::Sample(s) => self.show(&s),
            other                   => log_device_event(&other),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FeedScreen
// ════════════════════════════════════════════════════════════════════════════

/// Pages through the feed on head tilt and rotates the head model.
///
/// After a page change, paging stays suppressed until the re-enable timer
/// fires in [`Screen::tick`].
pub struct FeedScreen<N: NavigationSink, R: RotationSink> {
    mapper:   MotionStateMapper,
    pager:    N,
    rotation: R,
    reenable: OneShot,
}

impl<N: NavigationSink, R: RotationSink> FeedScreen<N, R> {
    pub fn new(pager: N, rotation: R) -> Self {
        FeedScreen { mapper: MotionStateMapper::new(), pager, rotation, reenable: OneShot::new() }
    }

    pub fn pager(&self)    -> &N { &self.pager }
    pub fn rotation(&self) -> &R { &self.rotation }
    pub fn mapper(&self)   -> &MotionStateMapper { &self.mapper }

    fn page_if_needed(&mut self, sample: &MotionSample, now: Instant) {
        let current  = self.pager.current_index();
        let decision = self.mapper.page_change(sample, current, self.pager.item_count(), now);
        debug!(
            pitch_degrees = sample.attitude.pitch * DEGREES_PER_RADIAN,
            current,
            ?decision,
            "page change evaluated"
        );
        if !decision.is_change() {
            return;
        }
        self.pager.navigate(decision);
        if let Some(expiry) = self.mapper.debounce_expiry() {
            self.reenable.arm(expiry);
        }
    }
}

impl<N: NavigationSink, R: RotationSink> Screen for FeedScreen<N, R> {
    fn handle_update(&mut self, update: MotionUpdate, now: Instant) {
        match update {
            MotionUpdate::Sample(s) => {
                self.page_if_needed(&s, now);
                self.rotation.apply_rotation(self.mapper.rotation(&s));
            }
            other => log_device_event(&other),
        }
    }

    fn tick(&mut self, now: Instant) {
        if self.reenable.fire_if_due(now) {
            self.mapper.release_page_change();
            debug!("page changes re-enabled");
        }
    }

    fn next_deadline(&self) -> Option<Instant> { self.reenable.deadline() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
