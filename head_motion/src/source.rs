//! Motion sample sources — simulated, replayed from a file, or received from
//! a network bridge.
//!
//! The public interface is [`MotionUpdate`] delivered over an `mpsc` channel
//! and wrapped in a [`Subscription`].  Consumers don't need to know which
//! kind of source produced the updates.
//!
//! Every source runs on its own thread and only *sends*; all mapping happens
//! on the thread that owns the subscription.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use motion_state::{Attitude, MotionSample, SensorLocation, Vector3, DEGREES_PER_RADIAN};
use tracing::{info, warn};

use crate::error::MotionError;

// ════════════════════════════════════════════════════════════════════════════
// MotionUpdate
// ════════════════════════════════════════════════════════════════════════════

/// One notification from a motion source.
#[derive(Clone, Debug, PartialEq)]
pub enum MotionUpdate {
    /// The headphones (or the bridge feeding them) started delivering.
    Connected,
    /// The headphones stopped delivering.  The source may reconnect later.
    Disconnected,
    /// A well-formed sample.
    Sample(MotionSample),
    /// The tick carried no usable payload; the reason is for logging only.
    NoData(String),
}

// ════════════════════════════════════════════════════════════════════════════
// StopFlag
// ════════════════════════════════════════════════════════════════════════════

/// Cooperative stop signal shared between a [`Subscription`] and its source.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn set(&self)         { self.0.store(true, Ordering::Relaxed); }
    pub fn is_set(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

// ════════════════════════════════════════════════════════════════════════════
// MotionSource trait — unified interface for every backend
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`MotionUpdate`]s over a channel.
///
/// `run` must return soon after `stop` is set or `tx` is disconnected.
pub trait MotionSource: Send + 'static {
    fn name(&self) -> &'static str;

    /// Checked once at subscribe time.
    fn is_available(&self) -> bool { true }

    fn run(self: Box<Self>, tx: Sender<MotionUpdate>, stop: StopFlag);
}

// ════════════════════════════════════════════════════════════════════════════
// Subscription
// ════════════════════════════════════════════════════════════════════════════

/// Live connection to a running source.  Dropping it unsubscribes.
pub struct Subscription {
    name:   &'static str,
    rx:     Receiver<MotionUpdate>,
    stop:   StopFlag,
    handle: Option<JoinHandle<()>>,
}

/// Start `source` on its own thread and return the receiving end.
///
/// Fails with [`MotionError::Unavailable`] when the source reports it cannot
/// deliver; nothing is spawned in that case.
pub fn subscribe(source: Box<dyn MotionSource>) -> Result<Subscription, MotionError> {
    let name = source.name();
    if !source.is_available() {
        return Err(MotionError::Unavailable(format!("{} source", name)));
    }

    let (tx, rx) = mpsc::channel();
    let stop = StopFlag::default();
    let thread_stop = stop.clone();
    let handle = thread::Builder::new()
        .name(format!("motion-{}", name))
        .spawn(move || source.run(tx, thread_stop))?;

    info!(source = name, "subscribed to motion updates");
    Ok(Subscription { name, rx, stop, handle: Some(handle) })
}

impl Subscription {
    pub fn name(&self) -> &'static str { self.name }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<MotionUpdate, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Stop the source and wait for its thread to finish.
    pub fn unsubscribe(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.set();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(source = self.name, "motion source thread panicked");
            }
            info!(source = self.name, "unsubscribed from motion updates");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn period_for(rate_hz: f64) -> Result<Duration, MotionError> {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return Err(MotionError::InvalidConfig(format!("sample rate must be positive, got {}", rate_hz)));
    }
    Duration::try_from_secs_f64(1.0 / rate_hz).map_err(|e| {
        MotionError::InvalidConfig(format!("sample rate {} gives no usable period: {}", rate_hz, e))
    })
}

// ════════════════════════════════════════════════════════════════════════════
// SimMotionSource — synthetic head movement (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Parameters of the simulated wearer.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Samples per second.
    pub rate_hz:     f64,
    /// Peak nod pitch, degrees.  Above 10 the feed pages.
    pub nod_degrees: f64,
    /// Time for one full nod (up, down, back).
    pub nod_period:  Duration,
    /// Stop after this long; `None` runs until unsubscribed.
    pub duration:    Option<Duration>,
    pub location:    SensorLocation,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            rate_hz:     25.0,
            nod_degrees: 20.0,
            nod_period:  Duration::from_secs(4),
            duration:    None,
            location:    SensorLocation::HeadphoneLeft,
        }
    }
}

/// Source that nods and sways a virtual head.
///
/// Pitch follows `A·sin(ωt)`, yaw a slower half-amplitude sway and roll a
/// small tilt; rotation rates are the exact derivatives and gravity is the
/// unit vector implied by pitch and roll.
pub struct SimMotionSource {
    cfg:    SimConfig,
    period: Duration,
}

impl SimMotionSource {
    pub fn new(cfg: SimConfig) -> Result<Self, MotionError> {
        let period = period_for(cfg.rate_hz)?;
        if cfg.nod_period.is_zero() {
            return Err(MotionError::InvalidConfig("nod period must be non-zero".into()));
        }
        Ok(SimMotionSource { cfg, period })
    }

    /// The sample the simulated head produces `t` seconds after start.
    pub fn sample_at(&self, t: f64) -> MotionSample {
        let amp = self.cfg.nod_degrees / DEGREES_PER_RADIAN;
        let w   = 2.0 * std::f64::consts::PI / self.cfg.nod_period.as_secs_f64();

        let pitch = amp * (w * t).sin();
        let yaw   = 0.5 * amp * (0.5 * w * t).sin();
        let roll  = 0.15 * amp * (w * t).sin();

        let rotation_rate = Vector3::new(
            amp * w * (w * t).cos(),
            0.15 * amp * w * (w * t).cos(),
            0.25 * amp * w * (0.5 * w * t).cos(),
        );
        let gravity = Vector3::new(
            pitch.cos() * roll.sin(),
            -pitch.sin(),
            -pitch.cos() * roll.cos(),
        );

        MotionSample {
            timestamp: t,
            attitude: Attitude::new(pitch, roll, yaw),
            rotation_rate,
            gravity,
            sensor_location: self.cfg.location,
            ..MotionSample::default()
        }
    }
}

impl MotionSource for SimMotionSource {
    fn name(&self) -> &'static str { "sim" }

    fn run(self: Box<Self>, tx: Sender<MotionUpdate>, stop: StopFlag) {
        if tx.send(MotionUpdate::Connected).is_err() { return; }

        let limit = self.cfg.duration.map(|d| d.as_secs_f64());
        let mut tick: u64 = 0;
        loop {
            if stop.is_set() { return; }

            let t = tick as f64 / self.cfg.rate_hz;
            if limit.map_or(false, |l| t >= l) {
                let _ = tx.send(MotionUpdate::Disconnected);
                return;
            }
            if tx.send(MotionUpdate::Sample(self.sample_at(t))).is_err() { return; }

            tick += 1;
            thread::sleep(self.period);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayMotionSource — JSON-lines recording
// ════════════════════════════════════════════════════════════════════════════

/// Source that plays back a JSON-lines file, one [`MotionSample`] per line,
/// at a fixed cadence.  Blank lines and lines starting with `#` are skipped;
/// lines that fail to decode are delivered as [`MotionUpdate::NoData`].
pub struct ReplayMotionSource {
    path:   PathBuf,
    period: Duration,
}

impl ReplayMotionSource {
    pub fn new(path: impl Into<PathBuf>, rate_hz: f64) -> Result<Self, MotionError> {
        Ok(ReplayMotionSource { path: path.into(), period: period_for(rate_hz)? })
    }
}

/// Decode one recorded line.  `None` for lines carrying nothing.
pub(crate) fn decode_line(line_no: usize, line: &str) -> Option<MotionUpdate> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(match serde_json::from_str::<MotionSample>(line) {
        Ok(sample) => MotionUpdate::Sample(sample),
        Err(e)     => MotionUpdate::NoData(format!("line {}: {}", line_no, e)),
    })
}

impl MotionSource for ReplayMotionSource {
    fn name(&self) -> &'static str { "replay" }

    fn is_available(&self) -> bool { self.path.is_file() }

    fn run(self: Box<Self>, tx: Sender<MotionUpdate>, stop: StopFlag) {
        let file = match File::open(&self.path) {
            Ok(f)  => f,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot open motion recording");
                let _ = tx.send(MotionUpdate::Disconnected);
                return;
            }
        };
        if tx.send(MotionUpdate::Connected).is_err() { return; }

        for (i, line) in BufReader::new(file).lines().enumerate() {
            if stop.is_set() { return; }
            let update = match line {
                Ok(l)  => match decode_line(i + 1, &l) {
                    Some(u) => u,
                    None    => continue,
                },
                Err(e) => MotionUpdate::NoData(format!("line {}: {}", i + 1, e)),
            };
            if tx.send(update).is_err() { return; }
            thread::sleep(self.period);
        }

        let _ = tx.send(MotionUpdate::Disconnected);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UdpMotionSource — phone-side bridge
// ════════════════════════════════════════════════════════════════════════════

/// Datagram size limit; a JSON sample is a few hundred bytes.
const MAX_DATAGRAM: usize = 4096;

/// Socket read timeout; bounds how long `run` takes to notice `stop`.
const UDP_POLL: Duration = Duration::from_millis(100);

/// Source receiving JSON-encoded [`MotionSample`]s, one per datagram, from a
/// companion app that forwards the phone's headphone motion updates.
///
/// `Connected` is reported on the first datagram, `Disconnected` after
/// `silence` without one.
pub struct UdpMotionSource {
    socket:  UdpSocket,
    silence: Duration,
}

impl UdpMotionSource {
    pub fn bind(addr: SocketAddr, silence: Duration) -> Result<Self, MotionError> {
        let socket = UdpSocket::bind(addr).map_err(|source| MotionError::Bind { addr, source })?;
        socket.set_read_timeout(Some(UDP_POLL))?;
        Ok(UdpMotionSource { socket, silence })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> { self.socket.local_addr() }
}

pub(crate) fn decode_datagram(payload: &[u8]) -> MotionUpdate {
    match serde_json::from_slice::<MotionSample>(payload) {
        Ok(sample) => MotionUpdate::Sample(sample),
        Err(e)     => MotionUpdate::NoData(format!("bad datagram: {}", e)),
    }
}

impl MotionSource for UdpMotionSource {
    fn name(&self) -> &'static str { "udp" }

    fn run(self: Box<Self>, tx: Sender<MotionUpdate>, stop: StopFlag) {
        let mut buf       = [0u8; MAX_DATAGRAM];
        let mut connected = false;
        let mut last_seen = Instant::now();

        loop {
            if stop.is_set() { return; }

            let update = match self.socket.recv_from(&mut buf) {
                Ok((n, peer)) => {
                    last_seen = Instant::now();
                    if !connected {
                        connected = true;
                        info!(%peer, "motion bridge sending");
                        if tx.send(MotionUpdate::Connected).is_err() { return; }
                    }
                    decode_datagram(&buf[..n])
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    if connected && last_seen.elapsed() >= self.silence {
                        connected = false;
                        MotionUpdate::Disconnected
                    } else {
                        continue;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "motion bridge receive failed");
                    thread::sleep(UDP_POLL);
                    MotionUpdate::NoData(e.to_string())
                }
            };
            if tx.send(update).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn drain(sub: &Subscription) -> Vec<MotionUpdate> {
        let mut out = Vec::new();
        while let Ok(u) = sub.recv_timeout(WAIT) {
            out.push(u);
        }
        out
    }

    fn temp_file(tag: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("head_motion_{}_{}.jsonl", tag, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    struct Unplugged;
    impl MotionSource for Unplugged {
        fn name(&self) -> &'static str { "unplugged" }
        fn is_available(&self) -> bool { false }
        fn run(self: Box<Self>, _tx: Sender<MotionUpdate>, _stop: StopFlag) {
            panic!("unavailable source must not run");
        }
    }

    struct Endless { exited: Arc<AtomicBool> }
    impl MotionSource for Endless {
        fn name(&self) -> &'static str { "endless" }
        fn run(self: Box<Self>, tx: Sender<MotionUpdate>, stop: StopFlag) {
            while !stop.is_set() {
                let _ = tx.send(MotionUpdate::Sample(MotionSample::default()));
                thread::sleep(Duration::from_millis(1));
            }
            self.exited.store(true, Ordering::SeqCst);
        }
    }

    // ── subscription ─────────────────────────────────────────────────────

    #[test]
    fn unavailable_source_is_not_spawned() {
        match subscribe(Box::new(Unplugged)) {
            Err(MotionError::Unavailable(why)) => assert!(why.contains("unplugged")),
            other => panic!("expected Unavailable, got {:?}", other.map(|s| s.name())),
        }
    }

    #[test]
    fn dropping_subscription_stops_source() {
        let exited = Arc::new(AtomicBool::new(false));
        let sub = subscribe(Box::new(Endless { exited: exited.clone() })).unwrap();
        assert!(matches!(sub.recv_timeout(WAIT), Ok(MotionUpdate::Sample(_))));
        drop(sub);
        assert!(exited.load(Ordering::SeqCst));
    }

    #[test]
    fn unsubscribe_joins_source() {
        let exited = Arc::new(AtomicBool::new(false));
        let sub = subscribe(Box::new(Endless { exited: exited.clone() })).unwrap();
        sub.unsubscribe();
        assert!(exited.load(Ordering::SeqCst));
    }

    // ── sim ──────────────────────────────────────────────────────────────

    #[test]
    fn sim_rejects_bad_rate() {
        let cfg = SimConfig { rate_hz: 0.0, ..SimConfig::default() };
        assert!(matches!(SimMotionSource::new(cfg), Err(MotionError::InvalidConfig(_))));
    }

    #[test]
    fn sim_nod_peaks_at_quarter_period() {
        let sim = SimMotionSource::new(SimConfig::default()).unwrap();
        let rest = sim.sample_at(0.0);
        assert_eq!(rest.attitude.pitch, 0.0);

        let peak = sim.sample_at(1.0);
        let deg = peak.attitude.pitch * DEGREES_PER_RADIAN;
        assert!((deg - 20.0).abs() < 1e-9, "peak pitch {}", deg);

        let low = sim.sample_at(3.0);
        assert!((low.attitude.pitch * DEGREES_PER_RADIAN + 20.0).abs() < 1e-9);
    }

    #[test]
    fn sim_gravity_is_unit_length() {
        let sim = SimMotionSource::new(SimConfig::default()).unwrap();
        for i in 0..20 {
            let g = sim.sample_at(i as f64 * 0.37).gravity;
            let len = (g.x * g.x + g.y * g.y + g.z * g.z).sqrt();
            assert!((len - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sim_with_duration_connects_samples_and_disconnects() {
        let cfg = SimConfig {
            rate_hz:  1000.0,
            duration: Some(Duration::from_millis(10)),
            ..SimConfig::default()
        };
        let sub = subscribe(Box::new(SimMotionSource::new(cfg).unwrap())).unwrap();
        let updates = drain(&sub);

        assert_eq!(updates.first(), Some(&MotionUpdate::Connected));
        assert_eq!(updates.last(),  Some(&MotionUpdate::Disconnected));
        let samples = updates.iter().filter(|u| matches!(u, MotionUpdate::Sample(_))).count();
        assert_eq!(samples, 10);
    }

    // ── replay ───────────────────────────────────────────────────────────

    #[test]
    fn decode_line_skips_blank_and_comments() {
        assert_eq!(decode_line(1, ""), None);
        assert_eq!(decode_line(2, "   "), None);
        assert_eq!(decode_line(3, "# recorded on a walk"), None);
    }

    #[test]
    fn decode_line_reports_garbage_as_no_data() {
        match decode_line(7, "{not json") {
            Some(MotionUpdate::NoData(why)) => assert!(why.starts_with("line 7:")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn replay_missing_file_is_unavailable() {
        let src = ReplayMotionSource::new("/definitely/not/here.jsonl", 50.0).unwrap();
        assert!(matches!(subscribe(Box::new(src)), Err(MotionError::Unavailable(_))));
    }

    #[test]
    fn replay_delivers_file_in_order() {
        let path = temp_file("replay_order", concat!(
            "{\"attitude\":{\"pitch\":0.1}}\n",
            "\n",
            "oops\n",
            "{\"attitude\":{\"pitch\":-0.2},\"sensor_location\":\"headphone_right\"}\n",
        ));
        let src = ReplayMotionSource::new(&path, 1000.0).unwrap();
        let sub = subscribe(Box::new(src)).unwrap();
        let updates = drain(&sub);
        std::fs::remove_file(&path).ok();

        assert_eq!(updates.len(), 5);
        assert_eq!(updates[0], MotionUpdate::Connected);
        match &updates[1] {
            MotionUpdate::Sample(s) => assert_eq!(s.attitude.pitch, 0.1),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&updates[2], MotionUpdate::NoData(why) if why.starts_with("line 3:")));
        match &updates[3] {
            MotionUpdate::Sample(s) => {
                assert_eq!(s.attitude.pitch, -0.2);
                assert_eq!(s.sensor_location, SensorLocation::HeadphoneRight);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(updates[4], MotionUpdate::Disconnected);
    }

    // ── udp ──────────────────────────────────────────────────────────────

    #[test]
    fn udp_bridge_connects_on_first_datagram() {
        let src = UdpMotionSource::bind("127.0.0.1:0".parse().unwrap(), Duration::from_secs(60)).unwrap();
        let addr = src.local_addr().unwrap();
        let sub = subscribe(Box::new(src)).unwrap();

        let phone = UdpSocket::bind("127.0.0.1:0").unwrap();
        phone.send_to(br#"{"attitude":{"yaw":1.5}}"#, addr).unwrap();
        phone.send_to(b"garbage", addr).unwrap();

        assert_eq!(sub.recv_timeout(WAIT), Ok(MotionUpdate::Connected));
        match sub.recv_timeout(WAIT) {
            Ok(MotionUpdate::Sample(s)) => assert_eq!(s.attitude.yaw, 1.5),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(sub.recv_timeout(WAIT), Ok(MotionUpdate::NoData(_))));
    }

    #[test]
    fn udp_bridge_reports_silence_as_disconnect() {
        let src = UdpMotionSource::bind("127.0.0.1:0".parse().unwrap(), Duration::from_millis(150)).unwrap();
        let addr = src.local_addr().unwrap();
        let sub = subscribe(Box::new(src)).unwrap();

        UdpSocket::bind("127.0.0.1:0").unwrap()
            .send_to(br#"{"attitude":{"pitch":0.0}}"#, addr).unwrap();

        assert_eq!(sub.recv_timeout(WAIT), Ok(MotionUpdate::Connected));
        assert!(matches!(sub.recv_timeout(WAIT), Ok(MotionUpdate::Sample(_))));
        assert_eq!(sub.recv_timeout(WAIT), Ok(MotionUpdate::Disconnected));
    }

    #[test]
    fn udp_bind_failure_names_address() {
        let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        match UdpMotionSource::bind(addr, Duration::from_secs(1)) {
            Err(MotionError::Bind { addr: a, .. }) => assert_eq!(a, addr),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_)  => panic!("second bind on {} should fail", addr),
        }
    }
}
