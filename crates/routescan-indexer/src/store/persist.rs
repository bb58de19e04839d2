//! Durable blob persistence.
//!
//! The whole store is one self-describing JSON document, fully rewritten on
//! every save. Writes go to a temp file first and are renamed into place.

use super::{EndpointRecord, FileRecord};
use crate::IndexerError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoreBlob {
    #[serde(default)]
    pub endpoints: Vec<EndpointRecord>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

impl Default for StoreBlob {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            files: Vec::new(),
            next_id: first_id(),
        }
    }
}

fn first_id() -> u64 {
    1
}

/// Load the blob. Missing or corrupt data yields an empty store.
pub(crate) async fn load(path: &Path) -> StoreBlob {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(_) => return StoreBlob::default(),
    };

    match serde_json::from_str(&json) {
        Ok(blob) => blob,
        Err(e) => {
            warn!(path = ?path, error = %e, "Corrupt store blob, resetting to empty");
            StoreBlob::default()
        }
    }
}

/// Rewrite the blob. Atomic: write to temp file, then rename.
pub(crate) async fn save(path: &Path, blob: &StoreBlob) -> Result<(), IndexerError> {
    let json = serde_json::to_string_pretty(blob)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = ?path, size = json.len(), "Saved store blob");

    Ok(())
}
