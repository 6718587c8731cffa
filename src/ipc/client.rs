use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::error::{Result, SuggestionsError};

use super::protocol;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Shell-side half of the protocol: drop a request file into the shared
/// directory and wait for the daemon's response file.
pub struct RequestClient {
    dir: PathBuf,
    prefix: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl RequestClient {
    pub fn new(dir: PathBuf, timeout: Duration) -> Self {
        Self {
            dir,
            prefix: protocol::DEFAULT_PREFIX.to_string(),
            timeout,
            poll_interval: Duration::from_millis(20),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Send `text` and wait for the suggestion. The response file is consumed.
    /// On timeout the request file is removed so the daemon won't answer late.
    pub async fn request(&self, text: &str) -> Result<String> {
        let input = self
            .dir
            .join(protocol::request_file_name(&self.prefix, &next_token()));
        let output = protocol::response_path(&input).ok_or_else(|| {
            SuggestionsError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a request path: {}", input.display()),
            ))
        })?;

        tokio::fs::write(&input, format!("{text}\n")).await?;

        let start = Instant::now();
        loop {
            match tokio::fs::read_to_string(&output).await {
                Ok(suggestion) => {
                    let _ = tokio::fs::remove_file(&output).await;
                    return Ok(suggestion);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            if start.elapsed() >= self.timeout {
                let _ = tokio::fs::remove_file(&input).await;
                return Err(SuggestionsError::ResponseTimeout {
                    path: output,
                    waited_ms: self.timeout.as_millis() as u64,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// `<pid>-<nanos>-<seq>`: unique per process and per call.
fn next_token() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", std::process::id(), nanos, seq)
}
