//! Core error types.

use routescan_indexer::IndexerError;
use thiserror::Error;

/// Errors from configuration and coordination.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Error from the indexing engine
    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
