//! Read-only projections of the catalog into downstream formats.
//!
//! Every exporter regenerates its output from a full catalog snapshot and
//! keeps source order. A record with odd field values degrades to the
//! documented defaults instead of being dropped.

pub mod insights;
pub mod merchant;
pub mod sitemap;

mod xml;

pub use insights::{InsightEntry, InventoryInsights};
pub use merchant::{merchant_items, to_rss, to_tsv, ChannelInfo, MerchantItem, MERCHANT_COLUMNS};
pub use sitemap::{sitemap_urls, to_sitemap_xml, STATIC_PAGES};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to write tabular feed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write XML feed: {0}")]
    Xml(String),
}
