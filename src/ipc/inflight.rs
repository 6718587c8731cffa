use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::protocol;

/// Request paths currently owned by a running processor.
///
/// The lock covers only the check-insert in `accept` and the removal in
/// `release`; it is never held across I/O.
#[derive(Debug, Default)]
pub struct InFlightSet {
    paths: Mutex<HashSet<PathBuf>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate one watcher event. Returns false for ineligible paths and for paths
    /// already in flight; otherwise records the path and returns true.
    pub fn accept(&self, path: &Path) -> bool {
        if !protocol::is_eligible(path) {
            return false;
        }
        let mut paths = self.paths.lock().unwrap_or_else(|e| e.into_inner());
        if paths.contains(path) {
            tracing::debug!("already processing: {}", file_name(path));
            return false;
        }
        paths.insert(path.to_path_buf());
        true
    }

    /// Forget `path`, making it acceptable again.
    pub fn release(&self, path: &Path) {
        let mut paths = self.paths.lock().unwrap_or_else(|e| e.into_inner());
        paths.remove(path);
    }

    /// `accept`, returning a guard that releases the path when dropped.
    pub fn claim(self: &Arc<Self>, path: &Path) -> Option<Claim> {
        if !self.accept(path) {
            return None;
        }
        Some(Claim {
            set: Arc::clone(self),
            path: path.to_path_buf(),
        })
    }

    pub fn contains(&self, path: &Path) -> bool {
        let paths = self.paths.lock().unwrap_or_else(|e| e.into_inner());
        paths.contains(path)
    }

    pub fn len(&self) -> usize {
        let paths = self.paths.lock().unwrap_or_else(|e| e.into_inner());
        paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ownership of one in-flight path. Every exit path of a processor drops its
/// claim exactly once, including task abort.
#[derive(Debug)]
pub struct Claim {
    set: Arc<InFlightSet>,
    path: PathBuf,
}

impl Claim {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.set.release(&self.path);
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
