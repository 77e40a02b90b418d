//! Catalog command handlers: sync, search, import, insights.

use std::fmt::Write;
use std::path::Path;

use storefeed_core::{AppConfig, ProductRecord};
use storefeed_feeds::InventoryInsights;
use storefeed_store::{CatalogStore, SearchFilter, UploadHistory};

/// Runs one sync cycle against the configured supplier.
///
/// # Errors
///
/// Returns an error when credentials are missing or rejected, or the
/// catalog cannot be written.
pub(crate) async fn run_sync(config: &AppConfig, store: CatalogStore) -> anyhow::Result<()> {
    let sync = storefeed_sync::build_catalog_sync(config, store)?;
    let report = sync.run_once().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) async fn run_search(
    store: &CatalogStore,
    filter: &SearchFilter,
    as_json: bool,
) -> anyhow::Result<()> {
    let records = store.search(filter).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", format_table(&records));
    }
    Ok(())
}

/// Imports `file` as the whole catalog and records the upload.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a valid catalog, or
/// contains no products.
pub(crate) async fn run_import(
    store: &CatalogStore,
    uploads: &UploadHistory,
    file: &Path,
    user: &str,
) -> anyhow::Result<()> {
    uploads.entries().await?;
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
    let imported = store.import_csv(&bytes).await?;
    if imported == 0 {
        anyhow::bail!(
            "{} contains no products; catalog left unchanged",
            file.display()
        );
    }

    let filename = file.file_name().map_or_else(
        || file.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    uploads.record(&filename, user).await?;
    println!("imported {imported} products from {filename}");
    Ok(())
}

pub(crate) async fn run_insights(store: &CatalogStore, as_json: bool) -> anyhow::Result<()> {
    let insights = InventoryInsights::from_records(&store.load().await?);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    } else {
        print!("{}", insights.render_text());
    }
    Ok(())
}

/// One line per record plus a count, for terminal use.
pub(crate) fn format_table(records: &[ProductRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{:>10}  {:<12}  {}",
            record.price,
            record.availability().as_str(),
            record.title
        );
    }
    let _ = writeln!(out, "{} product(s)", records.len());
    out
}
