use crate::error::Result;

/// SIGINT/SIGTERM listener. Handlers are registered by `install`, so a signal
/// delivered any time after that is held until `recv` is awaited.
#[derive(Debug)]
pub struct ShutdownSignal {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    /// Register the handlers now. Must be called from inside a tokio runtime.
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Resolves on the first SIGINT or SIGTERM since `install`.
    #[cfg(unix)]
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => tracing::info!("received SIGTERM"),
            _ = self.sigint.recv() => tracing::info!("received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(self) {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c");
        } else {
            std::future::pending::<()>().await;
        }
    }
}
