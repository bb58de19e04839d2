//! Index coordination.
//!
//! One coordinator per workspace scope. It owns the store, drives full
//! passes and single-file updates, and notifies observers after each
//! mutating pass. Processing is strictly sequential: within a pass each
//! file's replace/append/record sequence completes before the next file is
//! touched, so observers never see an interleaved state.

use crate::{CoreError, ScanConfig};
use routescan_indexer::{
    fingerprint, recognize, ChangeKind, EndpointRecord, FileChange, NewEndpoint, Store, StoreStats,
    Walker, HANDLER_LOOKAHEAD,
};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of one full walk-and-index pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Files scanned this pass
    pub processed: usize,
    /// Files skipped (current, or unreadable)
    pub skipped: usize,
    /// Endpoints extracted from processed files
    pub endpoints_found: usize,
    /// Pass duration in milliseconds
    pub duration_ms: u64,
}

/// Observer invoked with the summary after each mutating pass.
pub type PassObserver = Box<dyn Fn(&PassSummary) + Send>;

/// Drives indexing for one workspace scope.
pub struct IndexCoordinator {
    config: ScanConfig,
    store: Store,
    in_progress: bool,
    observers: Vec<PassObserver>,
}

impl IndexCoordinator {
    /// Create a coordinator, opening the scope's store.
    pub async fn new(config: ScanConfig) -> Result<Self, CoreError> {
        config.ensure_dirs()?;
        let store = Store::open(&config.data_dir, &config.scope).await?;

        Ok(Self {
            config,
            store,
            in_progress: false,
            observers: Vec::new(),
        })
    }

    /// Register an observer notified after each full pass.
    pub fn subscribe(&mut self, observer: impl Fn(&PassSummary) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Run a full walk-and-index pass over the configured roots.
    ///
    /// Returns `None` when a pass is already active; such a request is a
    /// reported no-op, never queued.
    pub async fn refresh(&mut self) -> Result<Option<PassSummary>, CoreError> {
        if self.in_progress {
            warn!("Index pass already in progress, ignoring request");
            return Ok(None);
        }

        self.in_progress = true;
        let result = self.run_pass().await;
        self.in_progress = false;

        let summary = result?;
        for observer in &self.observers {
            observer(&summary);
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            endpoints = summary.endpoints_found,
            duration_ms = summary.duration_ms,
            "Index pass complete"
        );

        Ok(Some(summary))
    }

    /// Re-index a single file if it is stale.
    ///
    /// Skipped outright while a full pass is active, to avoid racing the
    /// bulk pass over the same records. Files outside the tracked extension
    /// are ignored.
    pub async fn reindex_file(&mut self, path: &Path) -> Result<(), CoreError> {
        if self.in_progress {
            debug!(path = ?path, "Full pass active, skipping single-file reindex");
            return Ok(());
        }
        if !self.is_tracked(path) {
            return Ok(());
        }
        if self.store.is_file_current(path).await {
            debug!(path = ?path, "File is current, nothing to do");
            return Ok(());
        }

        match self.scan_file(path).await {
            Ok(found) => {
                info!(path = ?path, endpoints = found, "Re-indexed file");
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to re-index file");
            }
        }

        Ok(())
    }

    /// Clear all records for a deleted file.
    pub async fn on_file_deleted(&mut self, path: &Path) -> Result<(), CoreError> {
        if !self.is_tracked(path) {
            return Ok(());
        }

        self.store.replace_endpoints_for_file(path).await?;
        self.store.remove_file(path).await?;

        info!(path = ?path, "Cleared records for deleted file");
        Ok(())
    }

    /// Dispatch a raw file-change event.
    pub async fn handle_change(&mut self, change: FileChange) -> Result<(), CoreError> {
        match change.kind {
            ChangeKind::Created | ChangeKind::Modified => self.reindex_file(&change.path).await,
            ChangeKind::Deleted => self.on_file_deleted(&change.path).await,
        }
    }

    /// All endpoints in the active scope.
    pub fn list_all(&self) -> Vec<EndpointRecord> {
        self.store.list_all()
    }

    /// Endpoints for one file in the active scope.
    pub fn list_for_file(&self, path: &Path) -> Vec<EndpointRecord> {
        self.store.list_for_file(path)
    }

    /// Search endpoints in the active scope.
    pub fn search(&self, term: &str) -> Vec<EndpointRecord> {
        self.store.search(term)
    }

    /// Aggregate counts for the active scope.
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Final flush of the store.
    pub async fn close(&mut self) -> Result<(), CoreError> {
        self.store.close().await?;
        Ok(())
    }

    async fn run_pass(&mut self) -> Result<PassSummary, CoreError> {
        let start = Instant::now();
        let mut summary = PassSummary::default();

        let walker = Walker::new(self.config.roots.clone(), self.config.exclude.clone())
            .with_extension(&self.config.extension);
        let candidates = walker.walk();

        debug!(count = candidates.len(), "Candidate files discovered");

        for path in candidates {
            if self.store.is_file_current(&path).await {
                summary.skipped += 1;
                continue;
            }

            match self.scan_file(&path).await {
                Ok(found) => {
                    summary.processed += 1;
                    summary.endpoints_found += found;
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to index file");
                    summary.skipped += 1;
                }
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        Ok(summary)
    }

    /// Scan one file: replace its prior endpoints, append the new set, and
    /// mark the file indexed. Returns the number of endpoints found.
    async fn scan_file(&mut self, path: &Path) -> Result<usize, CoreError> {
        let content = tokio::fs::read_to_string(path).await?;
        let fp = fingerprint(&content);
        let lines: Vec<&str> = content.lines().collect();

        self.store.replace_endpoints_for_file(path).await?;

        let mut found = 0;
        for (i, line) in lines.iter().enumerate() {
            let window_end = (i + 1 + HANDLER_LOOKAHEAD).min(lines.len());
            if let Some(m) = recognize(line, &lines[i + 1..window_end]) {
                self.store
                    .append_endpoint(NewEndpoint {
                        method: m.method,
                        path: m.path,
                        handler_name: m.handler_name,
                        file_path: path.to_path_buf(),
                        line_number: i + 1,
                        declaring_name: m.declaring_name,
                        fingerprint: fp.clone(),
                    })
                    .await?;
                found += 1;
            }
        }

        self.store.record_file(path).await?;

        Ok(found)
    }

    fn is_tracked(&self, path: &Path) -> bool {
        path.extension()
            .map_or(false, |e| e == self.config.extension.as_str())
    }
}
