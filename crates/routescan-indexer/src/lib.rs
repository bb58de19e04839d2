//! routescan indexing engine
//!
//! This crate provides the core of routescan, including:
//! - Lexical recognition of route decorator lines
//! - File system walking with exclusion patterns
//! - A durable, scoped store of endpoint and file records
//! - File watching with debounced change events

mod error;
pub mod recognizer;
pub mod store;
pub mod walker;
pub mod watcher;

pub use error::IndexerError;
pub use recognizer::{recognize, RouteMatch, HANDLER_LOOKAHEAD, UNKNOWN_HANDLER};
pub use store::{
    fingerprint, EndpointRecord, FileRecord, NewEndpoint, Store, StoreStats, DEFAULT_SCOPE,
};
pub use walker::{Walker, DEFAULT_EXTENSION};
pub use watcher::{ChangeKind, FileChange, FileWatcher, WatcherOptions};
