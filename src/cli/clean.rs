use crate::error::Result;
use crate::lifecycle;

/// Delete every file in the IPC directory. Meant for shell exit hooks.
pub fn run_clean() -> Result<()> {
    let settings = super::load_settings()?;
    let removed = lifecycle::purge(&settings.tmp_dir);
    eprintln!(
        "zsh-ai-suggestions: removed {} files from {}",
        removed,
        settings.tmp_dir.display()
    );
    Ok(())
}
