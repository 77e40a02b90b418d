//! File-backed catalog storage.
//!
//! The catalog is a single CSV file rewritten wholesale on every mutation.
//! Writers are serialized through an in-process lock and land via
//! temp-file-then-rename, so readers always see a complete file.

mod catalog;
mod codec;
mod error;
mod history;
pub mod query;
mod vendor;

pub use catalog::{CatalogStore, UpsertOutcome};
pub use error::StoreError;
pub use history::{UploadEntry, UploadHistory};
pub use query::SearchFilter;
