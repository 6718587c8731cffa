use tokio::io::BufReader;

use crate::error::Result;
use crate::repl;

/// Suggest for each line read from stdin.
pub async fn run_repl() -> Result<()> {
    let startup = super::load()?;
    let stdin = BufReader::new(tokio::io::stdin());
    let count = repl::run(stdin, tokio::io::stdout(), startup.suggester.as_ref()).await?;
    tracing::debug!("{} suggestions written", count);
    Ok(())
}
