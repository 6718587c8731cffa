//! Start-up and shutdown housekeeping for the daemon.

pub mod liveness;
pub mod signals;
pub mod sweep;

use std::fmt;

pub use liveness::{LivenessProbe, PgrepCounter, ProcessCounter};
pub use signals::ShutdownSignal;
pub use sweep::{purge, startup_sweep};

/// Why the daemon stopped serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// SIGINT or SIGTERM.
    Signal,
    /// The liveness probe saw no shells left.
    NoShells,
    /// The embedding caller asked to stop.
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Signal => write!(f, "signal"),
            StopReason::NoShells => write!(f, "no shells"),
            StopReason::Requested => write!(f, "requested"),
        }
    }
}
