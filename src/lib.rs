pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod ipc;
pub mod lifecycle;
pub mod logging;
pub mod repl;
pub mod server;
pub mod suggest;

pub use daemon::Daemon;
pub use error::{Result, SuggestionsError};
pub use lifecycle::StopReason;
pub use suggest::Suggester;
