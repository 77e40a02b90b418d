use storefeed_store::StoreError;
use storefeed_supplier::{AuthError, SupplierError};
use thiserror::Error;

/// Failures that end a sync cycle without touching the catalog.
///
/// Per-page supplier failures are not errors: they end pagination early and
/// are reported through [`crate::SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("supplier authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("catalog store error: {0}")]
    Store(#[from] StoreError),

    #[error("supplier client setup failed: {0}")]
    Supplier(#[from] SupplierError),
}
