use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::suggest::Suggester;

/// Read partial commands line by line and write one suggestion per line.
/// Blank lines are skipped; failed suggestions are logged and skipped.
/// Returns the number of suggestions written.
pub async fn run<R, W, S>(reader: R, mut writer: W, suggester: &S) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Suggester + ?Sized,
{
    let mut lines = reader.lines();
    let mut written = 0;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match suggester.suggest(input).await {
            Ok(suggestion) => {
                writer.write_all(suggestion.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                written += 1;
            }
            Err(e) => tracing::warn!("failed to suggest: {}", e),
        }
    }

    Ok(written)
}
