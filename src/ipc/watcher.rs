use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::error::{Result, SuggestionsError};

/// One item from the watcher's two channels.
#[derive(Debug)]
pub enum WatchEvent {
    /// File content was written.
    Written(PathBuf),
    /// The subscription reported a problem. Not fatal.
    Error(notify::Error),
}

/// Write-notification subscription on a single directory (non-recursive).
///
/// Create, rename and delete events are dropped; only data modifications are
/// surfaced, so the content is present by the time a request is read.
pub struct DirectoryWatcher {
    dir: PathBuf,
    events: UnboundedReceiver<PathBuf>,
    errors: UnboundedReceiver<notify::Error>,
    // Dropping the watcher ends the subscription.
    _watcher: RecommendedWatcher,
}

impl DirectoryWatcher {
    /// Subscribe to `dir`. The directory must already exist.
    pub fn subscribe(dir: &Path) -> Result<Self> {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = mpsc::unbounded_channel();

        let mut watcher =
            notify::recommended_watcher(move |res: std::result::Result<Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        if is_write(&event.kind) {
                            for path in event.paths {
                                let _ = event_tx.send(path);
                            }
                        }
                    }
                    Err(e) => {
                        let _ = error_tx.send(e);
                    }
                }
            })
            .map_err(|e| SuggestionsError::Watch {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| SuggestionsError::Watch {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            events,
            errors,
            _watcher: watcher,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Wait for the next write event or watcher error, whichever comes first.
    /// Cancel safe.
    pub async fn next(&mut self) -> Option<WatchEvent> {
        tokio::select! {
            Some(path) = self.events.recv() => Some(WatchEvent::Written(path)),
            Some(err) = self.errors.recv() => Some(WatchEvent::Error(err)),
            else => None,
        }
    }
}

fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}
