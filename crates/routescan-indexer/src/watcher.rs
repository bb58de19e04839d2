//! File system watcher for change-triggered re-indexing.
//!
//! Wraps `notify` with debouncing and exposes changes as a stream of
//! (path, kind) events. The indexing core consumes this stream without
//! caring which watch mechanism produced it.

use crate::IndexerError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebouncedEvent, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// File change type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File was created
    Created,
    /// File was modified
    Modified,
    /// File was deleted
    Deleted,
}

/// A file system change event.
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Path to the changed file
    pub path: PathBuf,
    /// Kind of change
    pub kind: ChangeKind,
}

/// Options for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherOptions {
    /// Debounce duration
    pub debounce_duration: Duration,
    /// Whether to watch recursively
    pub recursive: bool,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(500),
            recursive: true,
        }
    }
}

/// Debounced file system watcher.
pub struct FileWatcher {
    options: WatcherOptions,
    tx: mpsc::Sender<FileChange>,
    rx: mpsc::Receiver<FileChange>,
    _debouncers: Vec<Debouncer<RecommendedWatcher, RecommendedCache>>,
}

impl FileWatcher {
    /// Create a new file watcher.
    pub fn new(options: WatcherOptions) -> Self {
        let (tx, rx) = mpsc::channel(1000);
        Self {
            options,
            tx,
            rx,
            _debouncers: Vec::new(),
        }
    }

    /// Start watching a directory. May be called once per root.
    pub fn watch(&mut self, path: &Path) -> Result<(), IndexerError> {
        let path = path
            .canonicalize()
            .map_err(|_| IndexerError::NotFound(path.to_path_buf()))?;

        let tx = self.tx.clone();

        let mut debouncer = new_debouncer(
            self.options.debounce_duration,
            None,
            move |result: Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
                Ok(events) => {
                    for event in events {
                        if let Some(change) = convert_event(&event.event) {
                            if let Err(e) = tx.blocking_send(change) {
                                error!(error = %e, "Failed to send change event");
                            }
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        warn!(error = %e, "Watcher error");
                    }
                }
            },
        )
        .map_err(|e| IndexerError::Watcher(e.to_string()))?;

        let mode = if self.options.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        debouncer
            .watch(&path, mode)
            .map_err(|e: notify::Error| IndexerError::Watcher(e.to_string()))?;

        info!(path = ?path, recursive = self.options.recursive, "Started watching");

        self._debouncers.push(debouncer);

        Ok(())
    }

    /// Receive the next change event.
    pub async fn next(&mut self) -> Option<FileChange> {
        self.rx.recv().await
    }

    /// Try to receive a change event without blocking.
    pub fn try_next(&mut self) -> Option<FileChange> {
        self.rx.try_recv().ok()
    }
}

/// Convert a notify Event to a FileChange.
fn convert_event(event: &Event) -> Option<FileChange> {
    let path = event.paths.first()?.clone();

    // Only care about files, not directories.
    if path.is_dir() {
        return None;
    }

    let kind = match &event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Deleted,
        EventKind::Any | EventKind::Access(_) | EventKind::Other => return None,
    };

    debug!(path = ?path, kind = ?kind, "File change detected");

    Some(FileChange { path, kind })
}
