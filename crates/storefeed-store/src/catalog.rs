use std::path::{Path, PathBuf};
use std::sync::Arc;

use storefeed_core::{KeyField, NormalizationRules, ProductRecord};
use tokio::sync::Mutex;

use crate::query::{self, SearchFilter};
use crate::{codec, StoreError};

/// Whether an upsert replaced an existing record or appended a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated,
    Inserted,
}

/// Handle to the on-disk catalog.
///
/// Cloning is cheap; all clones share one write lock, so every
/// load-mutate-write cycle issued through this handle is serialized.
/// Reads take no lock.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    rules: Arc<NormalizationRules>,
    write_lock: Arc<Mutex<()>>,
}

impl CatalogStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, rules: NormalizationRules) -> Self {
        Self {
            path: path.into(),
            rules: Arc::new(rules),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn rules(&self) -> &NormalizationRules {
        &self.rules
    }

    /// Reads the full catalog. A missing file is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the file cannot be parsed, or
    /// [`StoreError::Io`] when it cannot be read.
    pub async fn load(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let bytes = self.raw_bytes().await?;
        codec::decode(&bytes, &self.path, &self.rules)
    }

    /// Current file contents, or an empty buffer when no catalog exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on any read failure other than not-found.
    pub async fn raw_bytes(&self) -> Result<Vec<u8>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    /// Overwrites the catalog with `records`.
    ///
    /// An empty `records` leaves the existing file untouched and returns `0`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub async fn replace_all(&self, records: Vec<ProductRecord>) -> Result<usize, StoreError> {
        if records.is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                "refusing to replace catalog with an empty record set"
            );
            return Ok(0);
        }
        let _guard = self.write_lock.lock().await;
        self.write_records(&records).await?;
        Ok(records.len())
    }

    /// Replaces the first record whose `key_field` matches, or appends.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the catalog cannot be read or written.
    pub async fn upsert(
        &self,
        record: ProductRecord,
        key_field: KeyField,
    ) -> Result<UpsertOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;

        let position = records
            .iter()
            .position(|existing| existing.key(key_field) == record.key(key_field));
        let outcome = if let Some(index) = position {
            records[index] = record;
            UpsertOutcome::Updated
        } else {
            records.push(record);
            UpsertOutcome::Inserted
        };

        self.write_records(&records).await?;
        tracing::info!(?outcome, total = records.len(), "catalog record upserted");
        Ok(outcome)
    }

    /// Removes every record whose `key_field` equals `key`, returning how
    /// many matched. The file is rewritten even when nothing matched, but
    /// never with an empty record set: deleting the last remaining records
    /// leaves the file as it was.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the catalog cannot be read or written.
    pub async fn delete_by_key(&self, key: &str, key_field: KeyField) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|record| record.key(key_field) != key);
        let removed = before - records.len();

        if records.is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                removed,
                "refusing to empty the catalog by delete; keeping existing file"
            );
            return Ok(removed);
        }

        self.write_records(&records).await?;
        tracing::info!(removed, total = records.len(), "catalog records deleted");
        Ok(removed)
    }

    /// Replaces every supplier-sourced record, keeping vendor-owned rows
    /// after the new set. Empty input is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the catalog cannot be read or written.
    pub async fn replace_supplier_records(
        &self,
        records: Vec<ProductRecord>,
    ) -> Result<usize, StoreError> {
        if records.is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                "no supplier records to write; keeping existing catalog"
            );
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;
        let vendor_rows: Vec<ProductRecord> = self
            .load()
            .await?
            .into_iter()
            .filter(ProductRecord::is_vendor_owned)
            .collect();

        let written = records.len();
        let kept = vendor_rows.len();
        let mut combined = records;
        combined.extend(vendor_rows);

        self.write_records(&combined).await?;
        tracing::info!(
            written,
            vendor_rows_kept = kept,
            "supplier records replaced"
        );
        Ok(written)
    }

    /// Parses an uploaded CSV and, if it is a valid catalog, replaces the
    /// store with it. Nothing is written when the upload is unreadable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] for an unparsable upload.
    pub async fn import_csv(&self, bytes: &[u8]) -> Result<usize, StoreError> {
        let records = codec::decode(bytes, Path::new("<upload>"), &self.rules)?;
        self.replace_all(records).await
    }

    /// Filters a fresh snapshot of the catalog, preserving file order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the catalog cannot be loaded.
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<ProductRecord>, StoreError> {
        let records = self.load().await?;
        Ok(query::search(records, filter))
    }

    /// First record whose title equals `title` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] on a miss.
    pub async fn get_by_title(&self, title: &str) -> Result<ProductRecord, StoreError> {
        let records = self.load().await?;
        query::find_by_title(records, title).ok_or_else(|| StoreError::NotFound {
            key: title.to_string(),
        })
    }

    /// Writes `records` to a sibling temp file and renames it over the
    /// catalog. Callers must hold `write_lock`.
    pub(crate) async fn write_records(&self, records: &[ProductRecord]) -> Result<(), StoreError> {
        let bytes = codec::encode(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            tracing::error!(path = %self.path.display(), error = %e, "catalog rename failed");
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io(&self.path, e));
        }

        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            bytes = bytes.len(),
            "catalog written"
        );
        Ok(())
    }

    pub(crate) fn write_lock(&self) -> &Mutex<()> {
        &self.write_lock
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "catalog".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}
