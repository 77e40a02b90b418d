//! `export` sub-commands.

use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};
use storefeed_core::AppConfig;
use storefeed_feeds::{merchant_items, sitemap_urls, to_rss, to_sitemap_xml, to_tsv, ChannelInfo};
use storefeed_store::CatalogStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MerchantFormat {
    Tsv,
    Xml,
}

#[derive(Debug, Subcommand)]
pub enum ExportCommands {
    /// Merchant product feed
    Merchant {
        #[arg(long, value_enum, default_value = "tsv")]
        format: MerchantFormat,

        /// Write here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// sitemap.xml for the storefront
    Sitemap {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// # Errors
///
/// Returns an error if the catalog cannot be read, the feed cannot be
/// rendered, or the output cannot be written.
pub(crate) async fn run_export(
    config: &AppConfig,
    store: &CatalogStore,
    command: ExportCommands,
) -> anyhow::Result<()> {
    let records = store.load().await?;

    let (body, output) = match command {
        ExportCommands::Merchant { format, output } => {
            let items = merchant_items(&records, &config.currency);
            let body = match format {
                MerchantFormat::Tsv => to_tsv(&items)?,
                MerchantFormat::Xml => to_rss(&items, &ChannelInfo::for_site(&config.site_url))?,
            };
            (body, output)
        }
        ExportCommands::Sitemap { output } => {
            let urls = sitemap_urls(&config.site_url, &records);
            (to_sitemap_xml(&urls)?, output)
        }
    };

    write_output(&body, output.as_deref()).await?;
    tracing::info!(products = records.len(), "export complete");
    Ok(())
}

async fn write_output(body: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, body)
                .await
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(body)?;
        }
    }
    Ok(())
}
