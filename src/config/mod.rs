pub mod backend;
pub mod settings;

pub use backend::*;
pub use settings::*;

use std::path::PathBuf;

/// Returns the global config directory path: `~/.config/zsh-ai-suggestions/`.
/// Honors `XDG_CONFIG_HOME` when it is set.
pub fn dirs_global() -> PathBuf {
    if let Some(xdg) = process_env("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("zsh-ai-suggestions");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("zsh-ai-suggestions")
}

/// Read a variable from the process environment. Empty values count as unset.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
