//! routescan core
//!
//! Configuration and the per-scope index coordinator that drives the
//! engine in `routescan-indexer`.

mod config;
mod coordinator;
mod error;

pub use config::ScanConfig;
pub use coordinator::{IndexCoordinator, PassObserver, PassSummary};
pub use error::CoreError;
