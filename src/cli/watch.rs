use crate::daemon::Daemon;
use crate::error::Result;
use crate::lifecycle::{ShutdownSignal, StopReason};

/// Run the file-watching daemon until a signal arrives or no shells remain.
pub async fn run_watch() -> Result<StopReason> {
    // Before anything else, so a signal during start-up still purges.
    let signal = ShutdownSignal::install()?;
    let startup = super::load()?;
    let daemon = Daemon::from_settings(&startup.settings, startup.suggester);
    daemon.run(signal).await
}
