//! One-shot deferred task, polled by the run loop.
//!
//! The loop asks for [`OneShot::deadline`] to bound how long it waits for the
//! next sample, then calls [`OneShot::fire_if_due`] on every pass.  Everything
//! happens on the loop's thread.

use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OneShot {
    deadline: Option<Instant>,
}

impl OneShot {
    pub fn new() -> Self { Self::default() }

    /// Schedule (or reschedule) the task for `at`.
    pub fn arm(&mut self, at: Instant) { self.deadline = Some(at); }

    pub fn deadline(&self) -> Option<Instant> { self.deadline }

    /// Returns true exactly once, on the first call at or after the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut t = OneShot::new();
        t.arm(t0 + Duration::from_millis(500));
        assert!(!t.fire_if_due(t0));
        assert!(!t.fire_if_due(t0 + Duration::from_millis(499)));
        assert!(t.fire_if_due(t0 + Duration::from_millis(500)));
        assert!(!t.fire_if_due(t0 + Duration::from_secs(10)));
        assert_eq!(t.deadline(), None);
    }

    #[test]
    fn unarmed_never_fires() {
        let mut t = OneShot::new();
        assert!(!t.fire_if_due(Instant::now()));
    }

    #[test]
    fn rearm_moves_deadline() {
        let t0 = Instant::now();
        let mut t = OneShot::new();
        t.arm(t0 + Duration::from_secs(1));
        t.arm(t0 + Duration::from_secs(2));
        assert_eq!(t.deadline(), Some(t0 + Duration::from_secs(2)));
        assert!(!t.fire_if_due(t0 + Duration::from_secs(1)));
        assert!(t.fire_if_due(t0 + Duration::from_secs(2)));
    }
}
