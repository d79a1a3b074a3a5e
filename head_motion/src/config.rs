//! Command-line interface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::{AppConfig, ScreenKind, SourceConfig};
use crate::error::MotionError;
use crate::source::SimConfig;

#[derive(Debug, Parser)]
#[command(name = "head_motion", version, about = "Headphone motion monitor and head-tilt feed")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. `info`, `head_motion=debug`).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a snapshot of every motion sample.
    Monitor(SourceArgs),
    /// Page through the color feed by tilting the head up or down.
    Feed(SourceArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Synthetic nodding head.
    Sim,
    /// JSON-lines recording given by --file.
    Replay,
    /// JSON datagrams from a phone bridge, received on --bind.
    Udp,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    #[arg(long, value_enum, default_value_t = SourceKind::Sim)]
    pub source: SourceKind,

    /// Recording to replay.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Address the bridge listener binds to.
    #[arg(long, default_value = "0.0.0.0:7878")]
    pub bind: SocketAddr,

    /// Sample cadence for sim and replay.
    #[arg(long, default_value_t = 25.0)]
    pub rate_hz: f64,

    /// Stop the simulation after this many seconds.
    #[arg(long)]
    pub duration_secs: Option<f64>,

    /// Peak simulated nod, degrees.
    #[arg(long, default_value_t = 20.0)]
    pub nod_degrees: f64,

    /// Seconds without a datagram before the bridge counts as disconnected.
    #[arg(long, default_value_t = 2.0)]
    pub silence_secs: f64,
}

fn positive_secs(what: &str, secs: f64) -> Result<Duration, MotionError> {
    let invalid = || MotionError::InvalidConfig(format!("{} must be a positive number of seconds, got {}", what, secs));
    if !(secs.is_finite() && secs > 0.0) {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

impl SourceArgs {
    fn into_source(self) -> Result<SourceConfig, MotionError> {
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0) {
            return Err(MotionError::InvalidConfig(format!("--rate-hz must be positive, got {}", self.rate_hz)));
        }
        Ok(match self.source {
            SourceKind::Sim => SourceConfig::Sim(SimConfig {
                rate_hz:     self.rate_hz,
                nod_degrees: self.nod_degrees,
                duration:    self.duration_secs.map(|s| positive_secs("--duration-secs", s)).transpose()?,
                ..SimConfig::default()
            }),
            SourceKind::Replay => {
                let path = self.file.ok_or_else(|| {
                    MotionError::InvalidConfig("--source replay needs --file".into())
                })?;
                SourceConfig::Replay { path, rate_hz: self.rate_hz }
            }
            SourceKind::Udp => SourceConfig::Udp {
                bind:    self.bind,
                silence: positive_secs("--silence-secs", self.silence_secs)?,
            },
        })
    }
}

impl Cli {
    pub fn into_config(self) -> Result<AppConfig, MotionError> {
        let (screen, args) = match self.command {
            Command::Monitor(a) => (ScreenKind::Monitor, a),
            Command::Feed(a)    => (ScreenKind::Feed, a),
        };
        Ok(AppConfig { screen, source: args.into_source()? })
    }
}
