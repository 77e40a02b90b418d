//! Vendor-scoped views and rewrites of the catalog.

use storefeed_core::ProductRecord;

use crate::{CatalogStore, StoreError};

impl CatalogStore {
    /// Records owned by `vendor_id`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the catalog cannot be loaded.
    pub async fn vendor_records(&self, vendor_id: &str) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|record| record.vendor_id.as_deref() == Some(vendor_id))
            .collect())
    }

    /// Swaps out every row owned by `vendor_id` for `records`, tagging each
    /// with the vendor id. Rows owned by others are left in place. An empty
    /// `records` clears the vendor's partition, unless that would leave the
    /// catalog empty, in which case the file is not touched and `0` is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the catalog cannot be read or written.
    pub async fn replace_vendor_records(
        &self,
        vendor_id: &str,
        records: Vec<ProductRecord>,
    ) -> Result<usize, StoreError> {
        let _guard = self.write_lock().lock().await;
        let mut catalog = self.load().await?;
        catalog.retain(|record| record.vendor_id.as_deref() != Some(vendor_id));

        let written = records.len();
        catalog.extend(records.into_iter().map(|mut record| {
            record.vendor_id = Some(vendor_id.to_string());
            record
        }));

        if catalog.is_empty() {
            tracing::warn!(
                vendor_id,
                "refusing to empty the catalog via vendor replace; keeping existing file"
            );
            return Ok(0);
        }

        self.write_records(&catalog).await?;
        tracing::info!(vendor_id, written, "vendor partition replaced");
        Ok(written)
    }

    /// Appends one record owned by `vendor_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the catalog cannot be read or written.
    pub async fn add_vendor_record(
        &self,
        vendor_id: &str,
        mut record: ProductRecord,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock().lock().await;
        let mut catalog = self.load().await?;
        record.vendor_id = Some(vendor_id.to_string());
        catalog.push(record);
        self.write_records(&catalog).await?;
        tracing::info!(vendor_id, total = catalog.len(), "vendor record added");
        Ok(())
    }
}
