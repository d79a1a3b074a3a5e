//! Application configuration and the serialized run loop.
//!
//! `run` opens the configured source, subscribes to it and drives one screen
//! until the source ends.  Every update and every timer callback is handled
//! on the calling thread.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::MotionError;
use crate::feed::FeedPager;
use crate::screen::{FeedScreen, MonitorScreen, Screen};
use crate::sink::{ConsoleText, LoggedRotation};
use crate::source::{
    subscribe, MotionSource, ReplayMotionSource, SimConfig, SimMotionSource, Subscription,
    UdpMotionSource,
};

/// Longest the loop blocks when no timer is pending.
const IDLE_WAIT: Duration = Duration::from_millis(250);

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenKind {
    /// Snapshot text plus head model rotation.
    Monitor,
    /// Head-tilt paging plus head model rotation.
    Feed,
}

/// Where motion samples come from.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceConfig {
    Sim(SimConfig),
    Replay { path: PathBuf, rate_hz: f64 },
    Udp { bind: SocketAddr, silence: Duration },
}

impl SourceConfig {
    pub fn open(&self) -> Result<Box<dyn MotionSource>, MotionError> {
        let source: Box<dyn MotionSource> = match self {
            SourceConfig::Sim(cfg) =>
                Box::new(SimMotionSource::new(cfg.clone())?),
            SourceConfig::Replay { path, rate_hz } =>
                Box::new(ReplayMotionSource::new(path.clone(), *rate_hz)?),
            SourceConfig::Udp { bind, silence } => {
                let src = UdpMotionSource::bind(*bind, *silence)?;
                info!(addr = %src.local_addr()?, "listening for motion bridge");
                Box::new(src)
            }
        };
        Ok(source)
    }
}

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub screen: ScreenKind,
    pub source: SourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            screen: ScreenKind::Monitor,
            source: SourceConfig::Sim(SimConfig::default()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the configured screen until its source ends.
///
/// An unavailable source is not an error: it is logged and the screen never
/// starts.
pub fn run(cfg: AppConfig) -> Result<(), MotionError> {
    let source = cfg.source.open()?;

    let subscription = match subscribe(source) {
        Ok(s) => s,
        Err(MotionError::Unavailable(why)) => {
            warn!(%why, "device motion is not available, staying idle");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let handled = match cfg.screen {
        ScreenKind::Monitor => {
            let mut screen = MonitorScreen::new(ConsoleText::stdout(), LoggedRotation::default());
            drive(&mut screen, &subscription)
        }
        ScreenKind::Feed => {
            let mut screen = FeedScreen::new(FeedPager::default(), LoggedRotation::default());
            drive(&mut screen, &subscription)
        }
    };

    info!(source = subscription.name(), updates = handled, "motion source finished");
    subscription.unsubscribe();
    Ok(())
}

/// Feed updates from `subscription` into `screen` until the source thread
/// exits, firing the screen's timers in between.  Returns the number of
/// updates handled.
pub fn drive<S: Screen>(screen: &mut S, subscription: &Subscription) -> usize {
    let mut handled = 0;
    loop {
        let now = Instant::now();
        screen.tick(now);

        let wait = screen.next_deadline()
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(IDLE_WAIT);

        match subscription.recv_timeout(wait) {
            Ok(update) => {
                screen.handle_update(update, Instant::now());
                handled += 1;
            }
            Err(RecvTimeoutError::Timeout)      => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    screen.tick(Instant::now());
    handled
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Sender;
    use std::thread;

    use motion_state::{Attitude, MotionSample, DEGREES_PER_RADIAN, PAGE_CHANGE_DEBOUNCE};

    use crate::sink::NavigationSink;
    use crate::source::{MotionUpdate, StopFlag};

    /// Plays a fixed list of (delay-before, update) pairs.
    struct Scripted(Vec<(Duration, MotionUpdate)>);
    impl MotionSource for Scripted {
        fn name(&self) -> &'static str { "scripted" }
        fn run(self: Box<Self>, tx: Sender<MotionUpdate>, stop: StopFlag) {
            for (delay, update) in self.0 {
                if stop.is_set() { return; }
                thread::sleep(delay);
                if tx.send(update).is_err() { return; }
            }
        }
    }

    fn nod(deg: f64) -> MotionUpdate {
        MotionUpdate::Sample(MotionSample::from_attitude(Attitude::new(deg / DEGREES_PER_RADIAN, 0.0, 0.0)))
    }

    #[test]
    fn default_config_is_simulated_monitor() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.screen, ScreenKind::Monitor);
        assert!(matches!(cfg.source, SourceConfig::Sim(_)));
    }

    #[test]
    fn unavailable_replay_runs_idle() {
        let cfg = AppConfig {
            screen: ScreenKind::Feed,
            source: SourceConfig::Replay { path: "/no/such/recording.jsonl".into(), rate_hz: 25.0 },
        };
        assert!(run(cfg).is_ok());
    }

    #[test]
    fn invalid_rate_is_config_error() {
        let cfg = AppConfig {
            screen: ScreenKind::Monitor,
            source: SourceConfig::Replay { path: "x.jsonl".into(), rate_hz: -1.0 },
        };
        assert!(matches!(run(cfg), Err(MotionError::InvalidConfig(_))));
    }

    #[test]
    fn drive_counts_every_update() {
        let script = vec![
            (Duration::ZERO, MotionUpdate::Connected),
            (Duration::ZERO, nod(0.0)),
            (Duration::ZERO, MotionUpdate::NoData("gap".into())),
            (Duration::ZERO, MotionUpdate::Disconnected),
        ];
        let sub = subscribe(Box::new(Scripted(script))).unwrap();
        let mut screen = FeedScreen::new(FeedPager::default(), LoggedRotation::default());
        assert_eq!(drive(&mut screen, &sub), 4);
    }

    #[test]
    fn drive_fires_reenable_timer_between_samples() {
        // The second nod lands inside the window and is ignored; the third
        // comes after the timer released the first change.
        let gap = PAGE_CHANGE_DEBOUNCE + Duration::from_millis(150);
        let script = vec![
            (Duration::ZERO, nod(15.0)),
            (Duration::from_millis(100), nod(15.0)),
            (gap, nod(15.0)),
        ];
        let sub = subscribe(Box::new(Scripted(script))).unwrap();
        let mut screen = FeedScreen::new(FeedPager::default(), LoggedRotation::default());
        drive(&mut screen, &sub);

        assert_eq!(screen.pager().current_index(), 2);
        assert!(screen.mapper().debounce().change_suppressed());
    }
}
