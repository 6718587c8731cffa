use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

use crate::suggest::{suggest_within, Suggester};

use super::inflight::{file_name, Claim};
use super::protocol;

/// What happened to one accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Response published at this path; the request file was removed.
    Published(PathBuf),
    /// The request file was gone before it could be read.
    Vanished,
    /// The first line was blank or longer than `MAX_LINE_BYTES`. The request
    /// file stays for the sweep.
    Empty,
    /// Read, backend or publish failure. Nothing was published.
    Failed(String),
}

/// Turns one accepted request file into one response file, or a logged no-op.
/// Failures are absorbed here: the shell side only ever sees a missing response.
#[derive(Clone)]
pub struct RequestProcessor {
    suggester: Arc<dyn Suggester>,
    settle_delay: Duration,
    deadline: Duration,
}

impl RequestProcessor {
    pub fn new(suggester: Arc<dyn Suggester>, settle_delay: Duration, deadline: Duration) -> Self {
        Self {
            suggester,
            settle_delay,
            deadline,
        }
    }

    /// Process the claimed request. The claim is released when this returns.
    pub async fn process(&self, claim: Claim) -> ProcessOutcome {
        self.run(claim.path()).await
    }

    async fn run(&self, input: &Path) -> ProcessOutcome {
        let name = file_name(input);
        tracing::debug!("processing: {}", name);

        let Some(output) = protocol::response_path(input) else {
            return ProcessOutcome::Failed(format!("not a request file: {name}"));
        };

        if tokio::fs::metadata(input).await.is_err() {
            tracing::debug!("file not accessible: {}", name);
            return ProcessOutcome::Vanished;
        }

        tokio::time::sleep(self.settle_delay).await;

        let line = match read_first_line(input).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("first line too long in file: {}", name);
                return ProcessOutcome::Empty;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("file removed before read: {}", name);
                return ProcessOutcome::Vanished;
            }
            Err(e) => {
                tracing::warn!("failed to read {}: {}", name, e);
                return ProcessOutcome::Failed(e.to_string());
            }
        };

        let text = line.trim();
        if text.is_empty() {
            tracing::debug!("empty input in file: {}", name);
            return ProcessOutcome::Empty;
        }

        let suggestion = match suggest_within(self.suggester.as_ref(), text, self.deadline).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(
                    "failed to get suggestion from {} for {}: {}",
                    self.suggester.name(),
                    name,
                    e
                );
                return ProcessOutcome::Failed(e.to_string());
            }
        };

        if let Err(e) = publish(&output, &suggestion).await {
            tracing::error!("failed to write output file {}: {}", output.display(), e);
            return ProcessOutcome::Failed(e.to_string());
        }

        tracing::debug!("suggestion generated for: {}", name);

        if let Err(e) = tokio::fs::remove_file(input).await {
            tracing::debug!("failed to remove {}: {}", name, e);
        }

        ProcessOutcome::Published(output)
    }
}

/// Longest first line accepted from a request file.
pub const MAX_LINE_BYTES: u64 = 64 * 1024;

/// First line of `path`, at most `MAX_LINE_BYTES` long. Empty file gives "".
/// `None` when no line break occurs within the cap.
async fn read_first_line(path: &Path) -> std::io::Result<Option<String>> {
    let file = tokio::fs::File::open(path).await?;
    let mut reader = BufReader::new(file).take(MAX_LINE_BYTES);
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n as u64 == MAX_LINE_BYTES && !line.ends_with('\n') {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Write `contents` to a `.tmp` sibling of `path` and rename it into place, so a
/// reader sees either no file or the complete content.
pub async fn publish(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = protocol::tmp_sibling(path);

    let result: std::io::Result<()> = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        set_file_permissions_0600(&tmp);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    result
}

/// Set file permissions to 0600 (owner read/write only).
#[cfg(unix)]
fn set_file_permissions_0600(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    let _ = std::fs::set_permissions(path, perms);
}

#[cfg(not(unix))]
fn set_file_permissions_0600(_path: &Path) {
    // No-op on non-Unix platforms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SuggestionsError};
    use crate::ipc::inflight::InFlightSet;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct Canned {
        reply: Option<&'static str>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Canned {
        fn ok(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(reply: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply),
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Suggester for Canned {
        async fn suggest(&self, input: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.reply {
                Some(reply) => Ok(format!("{input}{reply}")),
                None => Err(SuggestionsError::EmptySuggestion { backend: "canned" }),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn processor(suggester: Arc<Canned>) -> RequestProcessor {
        RequestProcessor::new(suggester, Duration::from_millis(5), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn publishes_and_removes_request() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("zsh-ai-input-42");
        std::fs::write(&input, "  git chec  \nsecond line ignored\n").unwrap();

        let set = Arc::new(InFlightSet::new());
        let claim = set.claim(&input).unwrap();
        let suggester = Canned::ok("kout main");

        let outcome = processor(suggester.clone()).process(claim).await;

        let output = tmp.path().join("zsh-ai-output-42");
        assert_eq!(outcome, ProcessOutcome::Published(output.clone()));
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "git checkout main"
        );
        assert!(!input.exists());
        assert!(!tmp.path().join("zsh-ai-output-42.tmp").exists());
        assert!(set.is_empty());
        assert_eq!(suggester.calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn published_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("zsh-ai-output-1");
        publish(&output, "ls -la").await.unwrap();

        let mode = std::fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn blank_input_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("zsh-ai-input-7");
        std::fs::write(&input, "   \t \n").unwrap();

        let set = Arc::new(InFlightSet::new());
        let suggester = Canned::ok("x");
        let outcome = processor(suggester.clone())
            .process(set.claim(&input).unwrap())
            .await;

        assert_eq!(outcome, ProcessOutcome::Empty);
        assert!(input.exists());
        assert!(!tmp.path().join("zsh-ai-output-7").exists());
        assert_eq!(suggester.calls.load(Ordering::SeqCst), 0);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn oversized_first_line_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("zsh-ai-input-8");
        std::fs::write(&input, "a".repeat(100 * 1024)).unwrap();

        let set = Arc::new(InFlightSet::new());
        let suggester = Canned::ok("x");
        let outcome = processor(suggester.clone())
            .process(set.claim(&input).unwrap())
            .await;

        assert_eq!(outcome, ProcessOutcome::Empty);
        assert!(input.exists());
        assert_eq!(suggester.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_line_within_cap_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("zsh-ai-input-9");
        let text = "b".repeat(60 * 1024);
        std::fs::write(&input, format!("{text}\n")).unwrap();

        let set = Arc::new(InFlightSet::new());
        let suggester = Canned::ok("!");
        let outcome = processor(suggester.clone())
            .process(set.claim(&input).unwrap())
            .await;

        assert!(matches!(outcome, ProcessOutcome::Published(_)));
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("zsh-ai-output-9")).unwrap(),
            format!("{text}!")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_reader_never_sees_partial_response() {
        const ROUNDS: usize = 20;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        let payload: String = (0..(1 << 20)).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let payload = Arc::new(payload);

        let writer = {
            let dir = dir.clone();
            let payload = payload.clone();
            tokio::spawn(async move {
                for i in 0..ROUNDS {
                    publish(&dir.join(format!("zsh-ai-output-{i}")), &payload)
                        .await
                        .unwrap();
                }
            })
        };

        let mut full_reads = 0;
        while !writer.is_finished() {
            for i in 0..ROUNDS {
                match tokio::fs::read_to_string(dir.join(format!("zsh-ai-output-{i}"))).await {
                    Ok(body) => {
                        assert_eq!(body.len(), payload.len(), "partial read of output {i}");
                        assert!(body == *payload);
                        full_reads += 1;
                    }
                    Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
                }
            }
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();

        for i in 0..ROUNDS {
            let body = std::fs::read_to_string(dir.join(format!("zsh-ai-output-{i}"))).unwrap();
            assert!(body == *payload);
            full_reads += 1;
        }
        assert!(full_reads >= ROUNDS);
    }

    #[tokio::test]
    async fn missing_file_is_vanished() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("zsh-ai-input-gone");

        let set = Arc::new(InFlightSet::new());
        let outcome = processor(Canned::ok("x"))
            .process(set.claim(&input).unwrap())
            .await;

        assert_eq!(outcome, ProcessOutcome::Vanished);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_leaves_request_in_place() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("zsh-ai-input-5");
        std::fs::write(&input, "docker ps\n").unwrap();

        let set = Arc::new(InFlightSet::new());
        let outcome = processor(Canned::failing())
            .process(set.claim(&input).unwrap())
            .await;

        assert!(matches!(outcome, ProcessOutcome::Failed(_)));
        assert!(input.exists());
        assert!(!tmp.path().join("zsh-ai-output-5").exists());
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn deadline_expiry_drops_request() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("zsh-ai-input-6");
        std::fs::write(&input, "cargo b\n").unwrap();

        let set = Arc::new(InFlightSet::new());
        let processor = RequestProcessor::new(
            Canned::slow("uild", Duration::from_secs(5)),
            Duration::ZERO,
            Duration::from_millis(50),
        );
        let outcome = processor.process(set.claim(&input).unwrap()).await;

        match outcome {
            ProcessOutcome::Failed(reason) => assert!(reason.contains("deadline")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!tmp.path().join("zsh-ai-output-6").exists());
        assert!(set.is_empty());
    }
}
