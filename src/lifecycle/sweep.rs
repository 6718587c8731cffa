use std::fs;
use std::path::Path;

use crate::ipc::protocol;

/// Remove leftover request files and `.tmp` files from a previous run.
/// Response files are kept. Returns the number of files deleted.
pub fn startup_sweep(dir: &Path) -> usize {
    let count = remove_files(dir, |name| protocol::is_stale(name));
    if count > 0 {
        tracing::info!("removed {} stale files from {}", count, dir.display());
    }
    count
}

/// Delete every regular file directly inside `dir` (non-recursive).
/// Returns the number of files deleted.
pub fn purge(dir: &Path) -> usize {
    let count = remove_files(dir, |_| true);
    if count > 0 {
        tracing::info!("cleaned up {} files", count);
    }
    count
}

fn remove_files<F>(dir: &Path, select: F) -> usize
where
    F: Fn(&str) -> bool,
{
    if !dir.exists() {
        return 0;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("failed to read directory {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut count = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        if !select(&name.to_string_lossy()) {
            continue;
        }
        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => count += 1,
            Err(e) => tracing::debug!("failed to remove file {}: {}", path.display(), e),
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn startup_sweep_removes_inputs_and_tmps_only() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "zsh-ai-input-1");
        touch(tmp.path(), "zsh-ai-input-2");
        touch(tmp.path(), "zsh-ai-output-1");
        touch(tmp.path(), "zsh-ai-output-3.tmp");
        touch(tmp.path(), "unrelated");
        fs::create_dir(tmp.path().join("nested-input-dir")).unwrap();

        assert_eq!(startup_sweep(tmp.path()), 3);
        assert_eq!(
            names(tmp.path()),
            vec!["nested-input-dir", "unrelated", "zsh-ai-output-1"]
        );
    }

    #[test]
    fn startup_sweep_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "zsh-ai-input-1");
        touch(tmp.path(), "zsh-ai-output-1");

        assert_eq!(startup_sweep(tmp.path()), 1);
        let after_first = names(tmp.path());
        assert_eq!(startup_sweep(tmp.path()), 0);
        assert_eq!(names(tmp.path()), after_first);
    }

    #[test]
    fn purge_removes_every_regular_file() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "zsh-ai-input-1");
        touch(tmp.path(), "zsh-ai-output-1");
        touch(tmp.path(), "zsh-ai-output-2.tmp");
        fs::create_dir(tmp.path().join("keep")).unwrap();
        touch(&tmp.path().join("keep"), "inner-input-1");

        assert_eq!(purge(tmp.path()), 3);
        assert_eq!(names(tmp.path()), vec!["keep"]);
        assert!(tmp.path().join("keep/inner-input-1").exists());
    }

    #[test]
    fn missing_directory_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert_eq!(startup_sweep(&missing), 0);
        assert_eq!(purge(&missing), 0);
    }
}
