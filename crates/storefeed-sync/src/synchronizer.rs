use std::collections::HashSet;
use std::time::Instant;

use storefeed_core::{AppConfig, ProductRecord};
use storefeed_store::CatalogStore;
use storefeed_supplier::{
    CredentialProvider, FieldMapper, ProductSource, RawProduct, SupplierClient,
    SupplierCredentials, SupplierError,
};
use tokio::sync::Mutex;

use crate::{SyncError, SyncOptions, SyncOutcome, SyncReport};

/// The production synchronizer: real supplier client and configured credentials.
pub type CatalogSync = FeedSynchronizer<SupplierClient, SupplierCredentials>;

/// Builds a [`CatalogSync`] from configuration.
///
/// # Errors
///
/// Returns [`SyncError::Supplier`] if the HTTP client cannot be built, or
/// [`SyncError::Auth`] when no supplier credentials are configured.
pub fn build_catalog_sync(
    config: &AppConfig,
    store: CatalogStore,
) -> Result<CatalogSync, SyncError> {
    let client = SupplierClient::from_config(config)?;
    let credentials = SupplierCredentials::from_config(config, &client)?;
    let mapper = FieldMapper::new(
        config.normalization.clone(),
        config.supplier_product_url_base.clone(),
    );
    Ok(FeedSynchronizer::new(
        client,
        credentials,
        store,
        mapper,
        SyncOptions::from_config(config),
    ))
}

/// Pages through a [`ProductSource`] and replaces the supplier-owned part of
/// the catalog with what it returned.
///
/// No store lock is held while fetching; only the final write takes one.
pub struct FeedSynchronizer<S, C> {
    source: S,
    credentials: C,
    store: CatalogStore,
    mapper: FieldMapper,
    options: SyncOptions,
    run_guard: Mutex<()>,
}

/// Accumulates mapped records for one cycle, dropping untitled rows and
/// repeated ids.
#[derive(Default)]
struct PageBuffer {
    records: Vec<ProductRecord>,
    seen_ids: HashSet<String>,
    pages_requested: u32,
    dropped_untitled: usize,
    dropped_duplicates: usize,
}

impl PageBuffer {
    fn push(&mut self, record: ProductRecord) {
        if record.title.trim().is_empty() {
            self.dropped_untitled += 1;
            return;
        }
        if !record.id.is_empty() && !self.seen_ids.insert(record.id.clone()) {
            self.dropped_duplicates += 1;
            return;
        }
        self.records.push(record);
    }

    fn report(&self, records_accumulated: usize, outcome: SyncOutcome) -> SyncReport {
        SyncReport {
            pages_requested: self.pages_requested,
            records_accumulated,
            dropped_untitled: self.dropped_untitled,
            dropped_duplicates: self.dropped_duplicates,
            outcome,
        }
    }
}

enum PageResult {
    Page(Vec<RawProduct>),
    Failed(Box<SupplierError>),
    TimedOut,
}

impl<S, C> FeedSynchronizer<S, C>
where
    S: ProductSource,
    C: CredentialProvider,
{
    pub fn new(
        source: S,
        credentials: C,
        store: CatalogStore,
        mapper: FieldMapper,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            credentials,
            store,
            mapper,
            options,
            run_guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    #[must_use]
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Runs one full sync cycle.
    ///
    /// Pagination stops on an empty page, a short page, a configured
    /// ceiling, or a failed page (the records gathered so far are kept).
    /// A page that exceeds its deadline aborts the cycle. When nothing was
    /// gathered the catalog is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Auth`] when no valid token can be obtained, and
    /// [`SyncError::Store`] when the catalog cannot be written. Neither
    /// leaves a partial catalog behind.
    pub async fn run_once(&self) -> Result<SyncReport, SyncError> {
        let Ok(_running) = self.run_guard.try_lock() else {
            tracing::info!("sync already in progress, skipping");
            return Ok(SyncReport::empty(SyncOutcome::AlreadyRunning));
        };

        let started = Instant::now();
        tracing::info!(page_size = self.options.page_size, "starting catalog sync");

        let mut buffer = PageBuffer::default();
        if let Some(reason) = self.paginate(&mut buffer).await? {
            tracing::warn!(
                pages_requested = buffer.pages_requested,
                "sync aborted: {reason}"
            );
            let accumulated = buffer.records.len();
            return Ok(buffer.report(accumulated, SyncOutcome::Aborted { reason }));
        }

        let records_accumulated = buffer.records.len();
        let outcome = if buffer.records.is_empty() {
            tracing::warn!(
                pages_requested = buffer.pages_requested,
                "no products fetched, keeping existing catalog"
            );
            SyncOutcome::SkippedEmpty
        } else {
            let written = self
                .store
                .replace_supplier_records(std::mem::take(&mut buffer.records))
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "sync failed writing catalog");
                    e
                })?;
            SyncOutcome::Replaced { written }
        };

        tracing::info!(
            pages_requested = buffer.pages_requested,
            records_accumulated,
            dropped_untitled = buffer.dropped_untitled,
            dropped_duplicates = buffer.dropped_duplicates,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            ?outcome,
            "catalog sync finished"
        );

        Ok(buffer.report(records_accumulated, outcome))
    }

    /// Requests pages into `buffer` until a stop condition is met.
    ///
    /// Returns `Some(reason)` when the cycle must be abandoned without
    /// writing, `None` when the buffer holds everything this run will get.
    async fn paginate(&self, buffer: &mut PageBuffer) -> Result<Option<String>, SyncError> {
        let mut token = self.credentials.access_token().await.map_err(|e| {
            tracing::error!(error = %e, "sync aborted: could not obtain supplier token");
            e
        })?;

        let page_size = self.options.page_size;
        let mut token_renewed = false;
        let mut page_num = 1u32;

        loop {
            if self.options.is_past_ceiling(page_num) {
                tracing::info!(page_num, "pagination ceiling reached");
                return Ok(None);
            }
            if buffer.pages_requested > 0 && !self.options.inter_page_delay.is_zero() {
                tokio::time::sleep(self.options.inter_page_delay).await;
            }

            buffer.pages_requested += 1;
            let page = match self.fetch_page(&token, page_num).await {
                PageResult::Page(page) => page,
                PageResult::Failed(e) if e.is_token_rejected() && !token_renewed => {
                    tracing::warn!(page_num, error = %e, "supplier rejected token, renewing");
                    token_renewed = true;
                    self.credentials.invalidate().await;
                    token = self.credentials.access_token().await?;
                    continue;
                }
                PageResult::Failed(e) => {
                    tracing::warn!(
                        page_num,
                        error = %e,
                        "page fetch failed, treating as end of data"
                    );
                    return Ok(None);
                }
                PageResult::TimedOut => {
                    return Ok(Some(format!("page {page_num} exceeded its deadline")));
                }
            };

            let count = page.len();
            for raw in &page {
                buffer.push(self.mapper.map(raw));
            }
            tracing::debug!(
                page_num,
                count,
                total = buffer.records.len(),
                "page accumulated"
            );

            if count == 0 || count < page_size as usize {
                return Ok(None);
            }
            page_num += 1;
        }
    }

    async fn fetch_page(&self, token: &str, page_num: u32) -> PageResult {
        let request = self
            .source
            .fetch_page(token, page_num, self.options.page_size);
        let result = match self.options.page_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, request).await {
                Ok(result) => result,
                Err(_) => return PageResult::TimedOut,
            },
            None => request.await,
        };
        match result {
            Ok(page) => PageResult::Page(page),
            Err(e) => PageResult::Failed(Box::new(e)),
        }
    }
}
