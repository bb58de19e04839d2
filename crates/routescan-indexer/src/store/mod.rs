//! Durable endpoint index store.
//!
//! Owns two insertion-ordered record collections (endpoints and tracked
//! files) plus a monotonic id counter, scoped to one logical workspace.
//! Every public mutating operation rewrites the durable blob before
//! returning; there is no write buffering.

mod persist;

use crate::IndexerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scope used when the caller supplies none.
pub const DEFAULT_SCOPE: &str = "default";

/// Verb ordering for query results. Unlisted verbs sort after all of these.
const VERB_PRIORITY: [&str; 7] = ["get", "post", "put", "patch", "delete", "options", "head"];

/// One detected route endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Monotonic id, never reused within a store's lifetime
    pub id: u64,
    /// HTTP verb, lowercase
    pub method: String,
    /// Route path literal as written in source
    pub path: String,
    /// Handler function name, or `"unknown"`
    pub handler_name: String,
    /// Absolute path of the declaring file
    pub file_path: PathBuf,
    /// 1-based line number of the decorator line
    pub line_number: usize,
    /// Identifier before the first `.` in the decorator
    pub declaring_name: String,
    /// Fingerprint of the owning file's content at scan time
    pub fingerprint: String,
    /// Workspace scope this record belongs to
    pub scope: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One tracked source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: u64,
    pub file_path: PathBuf,
    pub fingerprint: String,
    /// Last modified time, unix seconds
    pub last_modified: u64,
    pub indexed: bool,
    pub scope: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new endpoint; the store assigns id, scope and timestamp.
#[derive(Debug, Clone)]
pub struct NewEndpoint {
    pub method: String,
    pub path: String,
    pub handler_name: String,
    pub file_path: PathBuf,
    pub line_number: usize,
    pub declaring_name: String,
    pub fingerprint: String,
}

/// Aggregate counts for the active scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub total_endpoints: usize,
    pub total_files: usize,
    pub indexed_files: usize,
}

/// Scoped, durable store of endpoint and file records.
pub struct Store {
    blob_path: PathBuf,
    scope: String,
    data: persist::StoreBlob,
}

impl Store {
    /// Open the store for one scope, loading the durable blob if present.
    ///
    /// A missing or corrupt blob resets the store to empty rather than
    /// failing startup.
    pub async fn open(base_dir: &Path, scope: &str) -> Result<Self, IndexerError> {
        tokio::fs::create_dir_all(base_dir).await?;

        let blob_path = base_dir.join(format!("{}.json", scope_hash(scope)));
        let data = persist::load(&blob_path).await;

        debug!(
            path = ?blob_path,
            scope = %scope,
            endpoints = data.endpoints.len(),
            files = data.files.len(),
            "Opened store"
        );

        Ok(Self {
            blob_path,
            scope: scope.to_string(),
            data,
        })
    }

    /// The active scope identifier.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Whether the stored record for `path` still matches the live file.
    ///
    /// False when no record exists, the file is unreadable (callers retry),
    /// or the live fingerprint or modification time differs.
    pub async fn is_file_current(&self, path: &Path) -> bool {
        let Some(record) = self
            .data
            .files
            .iter()
            .find(|f| f.file_path == path && f.scope == self.scope)
        else {
            return false;
        };

        let meta = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(_) => return false,
        };
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(_) => return false,
        };

        record.last_modified == modified_secs(&meta) && record.fingerprint == fingerprint(&content)
    }

    /// Insert or update the file record for `path`, computed from the live
    /// file. Updates preserve id and creation timestamp.
    pub async fn record_file(&mut self, path: &Path) -> Result<(), IndexerError> {
        let content = tokio::fs::read_to_string(path).await?;
        let meta = tokio::fs::metadata(path).await?;
        let fp = fingerprint(&content);
        let mtime = modified_secs(&meta);

        if let Some(existing) = self
            .data
            .files
            .iter_mut()
            .find(|f| f.file_path == path && f.scope == self.scope)
        {
            existing.fingerprint = fp;
            existing.last_modified = mtime;
            existing.indexed = true;
        } else {
            let id = self.take_id();
            self.data.files.push(FileRecord {
                id,
                file_path: path.to_path_buf(),
                fingerprint: fp,
                last_modified: mtime,
                indexed: true,
                scope: self.scope.clone(),
                created_at: Utc::now(),
            });
        }

        self.save().await
    }

    /// Remove all endpoint records for `path` in the active scope.
    /// Idempotent.
    pub async fn replace_endpoints_for_file(&mut self, path: &Path) -> Result<(), IndexerError> {
        let scope = self.scope.clone();
        self.data
            .endpoints
            .retain(|e| !(e.file_path == path && e.scope == scope));
        self.save().await
    }

    /// Append a new endpoint record, assigning a fresh id and timestamp.
    pub async fn append_endpoint(&mut self, new: NewEndpoint) -> Result<u64, IndexerError> {
        let id = self.take_id();
        self.data.endpoints.push(EndpointRecord {
            id,
            method: new.method,
            path: new.path,
            handler_name: new.handler_name,
            file_path: new.file_path,
            line_number: new.line_number,
            declaring_name: new.declaring_name,
            fingerprint: new.fingerprint,
            scope: self.scope.clone(),
            created_at: Utc::now(),
        });
        self.save().await?;
        Ok(id)
    }

    /// Remove the file record for `path` in the active scope.
    pub async fn remove_file(&mut self, path: &Path) -> Result<(), IndexerError> {
        let scope = self.scope.clone();
        self.data
            .files
            .retain(|f| !(f.file_path == path && f.scope == scope));
        self.save().await
    }

    /// All current-scope endpoints, ordered by file path, line number, then
    /// verb priority.
    pub fn list_all(&self) -> Vec<EndpointRecord> {
        let mut records = self.scoped_endpoints();
        records.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then(a.line_number.cmp(&b.line_number))
                .then(compare_by_verb(a, b))
        });
        records
    }

    /// Current-scope endpoints for one file, ordered by line number then
    /// verb priority.
    pub fn list_for_file(&self, path: &Path) -> Vec<EndpointRecord> {
        let mut records: Vec<_> = self
            .scoped_endpoints()
            .into_iter()
            .filter(|e| e.file_path == path)
            .collect();
        records.sort_by(|a, b| a.line_number.cmp(&b.line_number).then(compare_by_verb(a, b)));
        records
    }

    /// Case-insensitive substring search over verb, path, handler name and
    /// file path. Results ordered by verb priority.
    pub fn search(&self, term: &str) -> Vec<EndpointRecord> {
        let needle = term.to_lowercase();
        let mut records: Vec<_> = self
            .scoped_endpoints()
            .into_iter()
            .filter(|e| {
                e.method.to_lowercase().contains(&needle)
                    || e.path.to_lowercase().contains(&needle)
                    || e.handler_name.to_lowercase().contains(&needle)
                    || e.file_path.to_string_lossy().to_lowercase().contains(&needle)
            })
            .collect();
        records.sort_by(compare_by_verb);
        records
    }

    /// Aggregate counts for the active scope.
    pub fn stats(&self) -> StoreStats {
        let files: Vec<_> = self
            .data
            .files
            .iter()
            .filter(|f| f.scope == self.scope)
            .collect();
        StoreStats {
            total_endpoints: self.scoped_endpoints().len(),
            total_files: files.len(),
            indexed_files: files.iter().filter(|f| f.indexed).count(),
        }
    }

    /// Final flush to durable storage.
    pub async fn close(&mut self) -> Result<(), IndexerError> {
        self.save().await
    }

    fn scoped_endpoints(&self) -> Vec<EndpointRecord> {
        self.data
            .endpoints
            .iter()
            .filter(|e| e.scope == self.scope)
            .cloned()
            .collect()
    }

    fn take_id(&mut self) -> u64 {
        let id = self.data.next_id;
        self.data.next_id += 1;
        id
    }

    async fn save(&self) -> Result<(), IndexerError> {
        persist::save(&self.blob_path, &self.data).await
    }
}

/// SHA-256 fingerprint of file content, hex encoded.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable short hash of a scope identifier, used as the blob file name.
fn scope_hash(scope: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(scope.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

fn modified_secs(meta: &std::fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Rank of a verb in the fixed priority ordering; unrecognized verbs sort
/// after all recognized ones.
fn verb_rank(method: &str) -> usize {
    VERB_PRIORITY
        .iter()
        .position(|v| method.eq_ignore_ascii_case(v))
        .unwrap_or(VERB_PRIORITY.len())
}

fn compare_by_verb(a: &EndpointRecord, b: &EndpointRecord) -> std::cmp::Ordering {
    verb_rank(&a.method)
        .cmp(&verb_rank(&b.method))
        .then_with(|| a.method.cmp(&b.method))
        .then_with(|| a.path.cmp(&b.path))
}
