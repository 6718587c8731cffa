use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::config::Settings;
use crate::error::{Result, SuggestionsError};
use crate::ipc::{DirectoryWatcher, InFlightSet, ProcessOutcome, RequestProcessor, WatchEvent};
use crate::lifecycle::{self, LivenessProbe, ShutdownSignal, StopReason};
use crate::suggest::Suggester;

/// Watches the IPC directory and answers request files until told to stop.
pub struct Daemon {
    dir: PathBuf,
    suggester: Arc<dyn Suggester>,
    in_flight: Arc<InFlightSet>,
    settle_delay: Duration,
    deadline: Duration,
    liveness: Option<LivenessProbe>,
}

impl Daemon {
    pub fn new(dir: PathBuf, suggester: Arc<dyn Suggester>) -> Self {
        let defaults = Settings::default();
        Self {
            dir,
            suggester,
            in_flight: Arc::new(InFlightSet::new()),
            settle_delay: defaults.settle_delay,
            deadline: defaults.request_timeout,
            liveness: None,
        }
    }

    /// Daemon configured from resolved settings. The liveness probe is
    /// enabled only when `cleanup_on_exit` is set.
    pub fn from_settings(settings: &Settings, suggester: Arc<dyn Suggester>) -> Self {
        let daemon = Self::new(settings.tmp_dir.clone(), suggester)
            .with_settle_delay(settings.settle_delay)
            .with_deadline(settings.request_timeout);
        if settings.cleanup_on_exit {
            daemon.with_liveness(LivenessProbe::system(
                settings.shell_program.clone(),
                settings.liveness_interval,
            ))
        } else {
            daemon
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_liveness(mut self, probe: LivenessProbe) -> Self {
        self.liveness = Some(probe);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serve until `signal` fires. Install the signal before loading config so
    /// an early SIGINT still reaches the shutdown purge.
    pub async fn run(self, signal: ShutdownSignal) -> Result<StopReason> {
        self.serve(signal.recv(), StopReason::Signal).await
    }

    /// Serve until `stop` resolves (or the liveness probe fires).
    pub async fn serve_until<F>(self, stop: F) -> Result<StopReason>
    where
        F: Future<Output = ()>,
    {
        self.serve(stop, StopReason::Requested).await
    }

    async fn serve<F>(self, stop: F, stop_reason: StopReason) -> Result<StopReason>
    where
        F: Future<Output = ()>,
    {
        lifecycle::startup_sweep(&self.dir);
        create_dir_0755(&self.dir)?;
        let mut watcher = DirectoryWatcher::subscribe(&self.dir)?;

        tracing::info!(
            "watching {} with {} backend",
            self.dir.display(),
            self.suggester.name()
        );

        let processor = RequestProcessor::new(
            Arc::clone(&self.suggester),
            self.settle_delay,
            self.deadline,
        );
        let mut tasks: JoinSet<ProcessOutcome> = JoinSet::new();

        let liveness = async {
            match &self.liveness {
                Some(probe) => probe.watch().await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(stop);
        tokio::pin!(liveness);

        let outcome = loop {
            tokio::select! {
                event = watcher.next() => match event {
                    Some(WatchEvent::Written(path)) => {
                        if let Some(claim) = self.in_flight.claim(&path) {
                            let processor = processor.clone();
                            tasks.spawn(async move { processor.process(claim).await });
                        }
                    }
                    Some(WatchEvent::Error(e)) => {
                        tracing::warn!("watcher error: {}", e);
                    }
                    None => {
                        break Err(SuggestionsError::Watch {
                            path: self.dir.clone(),
                            reason: "event stream closed".into(),
                        });
                    }
                },
                _ = &mut stop => break Ok(stop_reason),
                _ = &mut liveness => break Ok(StopReason::NoShells),
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined {
                        Ok(outcome) => tracing::debug!("request finished: {:?}", outcome),
                        Err(e) if e.is_panic() => tracing::error!("request processor panicked: {}", e),
                        Err(_) => {}
                    }
                }
            }
        };

        // In-flight work is abandoned; each claim releases as its task drops.
        let abandoned = tasks.len();
        tasks.shutdown().await;
        if abandoned > 0 {
            tracing::debug!("abandoned {} in-flight requests", abandoned);
        }
        drop(watcher);

        lifecycle::purge(&self.dir);

        match &outcome {
            Ok(reason) => tracing::info!("daemon stopped ({})", reason),
            Err(e) => tracing::error!("daemon stopped: {}", e),
        }
        outcome
    }
}

#[cfg(unix)]
fn create_dir_0755(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(dir)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_dir_0755(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}
