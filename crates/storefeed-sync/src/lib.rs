//! Supplier-to-catalog synchronization.

mod error;
mod options;
mod report;
mod synchronizer;

pub use error::SyncError;
pub use options::SyncOptions;
pub use report::{SyncOutcome, SyncReport};
pub use synchronizer::{build_catalog_sync, CatalogSync, FeedSynchronizer};
