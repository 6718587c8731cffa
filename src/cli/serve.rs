use crate::error::Result;
use crate::lifecycle::ShutdownSignal;
use crate::server;

/// Serve suggestions over HTTP on `port`.
pub async fn run_serve(port: u16) -> Result<()> {
    let signal = ShutdownSignal::install()?;
    let startup = super::load()?;
    server::serve(
        port,
        startup.suggester,
        startup.settings.request_timeout,
        signal.recv(),
    )
    .await
}
