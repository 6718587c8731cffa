//! File-based IPC between the shell plugin and the daemon.

pub mod client;
pub mod inflight;
pub mod processor;
pub mod protocol;
pub mod watcher;

pub use client::RequestClient;
pub use inflight::{Claim, InFlightSet};
pub use processor::{ProcessOutcome, RequestProcessor};
pub use watcher::{DirectoryWatcher, WatchEvent};
