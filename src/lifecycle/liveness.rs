use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Result, SuggestionsError};

/// Counts running processes with a given program name.
#[async_trait]
pub trait ProcessCounter: Send + Sync {
    async fn count(&self, program: &str) -> Result<u32>;
}

/// Counts with `pgrep -c` where `/proc` exists, otherwise `ps -e | grep -c`.
pub struct PgrepCounter;

#[async_trait]
impl ProcessCounter for PgrepCounter {
    async fn count(&self, program: &str) -> Result<u32> {
        let output = if Path::new("/proc").exists() {
            Command::new("pgrep").arg("-c").arg(program).output().await?
        } else {
            Command::new("sh")
                .arg("-c")
                .arg(format!("ps -e | grep -c '{}'", bracket_pattern(program)))
                .output()
                .await?
        };

        // Both tools exit 1 when nothing matched.
        match output.status.code() {
            Some(0) => parse_count(&String::from_utf8_lossy(&output.stdout)),
            Some(1) => Ok(0),
            _ => Err(SuggestionsError::Io(std::io::Error::other(format!(
                "process count failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )))),
        }
    }
}

/// `zsh` -> `[z]sh`, so the grep doesn't match its own command line.
fn bracket_pattern(program: &str) -> String {
    let mut chars = program.chars();
    match chars.next() {
        Some(first) => format!("[{}]{}", first, chars.as_str()),
        None => String::new(),
    }
}

fn parse_count(stdout: &str) -> Result<u32> {
    stdout.trim().parse::<u32>().map_err(|e| {
        SuggestionsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unexpected process count {:?}: {}", stdout.trim(), e),
        ))
    })
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically checks whether any interactive shell is still running.
pub struct LivenessProbe {
    counter: Box<dyn ProcessCounter>,
    program: String,
    interval: Duration,
}

impl LivenessProbe {
    /// A zero `interval` is raised to one millisecond.
    pub fn new(
        counter: Box<dyn ProcessCounter>,
        program: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            counter,
            program: program.into(),
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Probe for `program` with the system process table.
    pub fn system(program: impl Into<String>, interval: Duration) -> Self {
        Self::new(Box::new(PgrepCounter), program, interval)
    }

    /// Returns once a tick observes zero matching processes. Counting errors
    /// are inconclusive and skipped.
    pub async fn watch(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick fires immediately; the first check is one interval in.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match self.counter.count(&self.program).await {
                Ok(0) => {
                    tracing::info!("no {} processes running, shutting down", self.program);
                    return;
                }
                Ok(n) => tracing::debug!("{} {} processes running", n, self.program),
                Err(e) => tracing::warn!("failed to count {} processes: {}", self.program, e),
            }
        }
    }
}

impl std::fmt::Debug for LivenessProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessProbe")
            .field("program", &self.program)
            .field("interval", &self.interval)
            .finish()
    }
}
