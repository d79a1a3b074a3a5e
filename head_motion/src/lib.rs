//! # head_motion
//!
//! Headphone motion monitor and head-tilt feed, built on `motion_state`.
//!
//! ## Screens
//!
//! | Screen | On each sample |
//! |---|---|
//! | `monitor` | Print a snapshot report; rotate the head model |
//! | `feed` | Tilt up > 10° → next page, tilt down → previous page, at most once a second; rotate the head model |
//!
//! ## Sources
//!
//! * `sim` (default) — **Simulation mode**: a synthetic head nods and sways.
//! * `replay` — a JSON-lines recording, one `MotionSample` per line.
//! * `udp` — JSON datagrams from a phone-side bridge forwarding the
//!   headphone motion API.
//!
//! Sources run on their own threads; every update is mapped on the thread
//! that calls [`app::run`].  Rendering is left to the host UI: screens write
//! to the sink traits in [`sink`].

pub mod error;
pub mod source;
pub mod sink;
pub mod timer;
pub mod feed;
pub mod screen;
pub mod app;
pub mod config;
