use std::time::Duration;

use crate::error::Result;
use crate::ipc::RequestClient;

/// Send one request through the IPC directory and print the suggestion.
/// A daemon must already be watching the directory.
pub async fn run_request(text: &str, timeout: Duration) -> Result<()> {
    let settings = super::load_settings()?;
    let client = RequestClient::new(settings.tmp_dir, timeout);
    let suggestion = client.request(text).await?;
    println!("{}", suggestion);
    Ok(())
}
