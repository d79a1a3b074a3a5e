//! Error type shared by sources, configuration and the run loop.

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    /// The motion source cannot deliver samples right now.  Callers treat
    /// this as non-fatal: log it and stay idle.
    #[error("device motion is not available: {0}")]
    Unavailable(String),

    #[error("failed to bind motion bridge socket {addr}: {source}")]
    Bind {
        addr:   SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
