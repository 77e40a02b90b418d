//! Merchant product feed (tab-separated and RSS 2.0 with the `g:` namespace).

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use storefeed_core::ProductRecord;

use crate::xml::XmlDoc;
use crate::FeedError;

/// Column order of the tab-separated feed.
pub const MERCHANT_COLUMNS: [&str; 11] = [
    "id",
    "title",
    "description",
    "link",
    "image_link",
    "price",
    "availability",
    "condition",
    "brand",
    "google_product_category",
    "shipping",
];

const GOOGLE_NS: &str = "http://base.google.com/ns/1.0";
const DEFAULT_BRAND: &str = "Generic";
const CONDITION: &str = "new";

static PRODUCT_DETAIL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"product-detail/(\d+)").expect("valid product-detail regex"));

/// One row of the merchant feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub image_link: String,
    pub price: String,
    pub availability: String,
    pub condition: String,
    pub brand: String,
    pub google_product_category: String,
    pub shipping: String,
}

/// Channel metadata for the RSS rendition.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl ChannelInfo {
    /// The storefront's default channel, linking back to `site_url`.
    #[must_use]
    pub fn for_site(site_url: &str) -> Self {
        Self {
            title: "Product catalog".to_string(),
            link: site_url.to_string(),
            description: "Merchant product feed".to_string(),
        }
    }
}

impl MerchantItem {
    #[must_use]
    pub fn from_record(record: &ProductRecord, currency: &str) -> Self {
        let link = record.url.trim().to_string();
        let id = if record.id.trim().is_empty() {
            PRODUCT_DETAIL_ID
                .captures(&link)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        } else {
            record.id.trim().to_string()
        };
        let brand = match record.brand.trim() {
            "" => DEFAULT_BRAND.to_string(),
            brand => brand.to_string(),
        };
        let shipping = match record.shipping.trim() {
            "" => format_money(Decimal::ZERO, currency),
            shipping => shipping.to_string(),
        };

        Self {
            id,
            title: record.title.trim().to_string(),
            description: record.description.trim().to_string(),
            link,
            image_link: record.image.trim().to_string(),
            price: format_money(record.price, currency),
            availability: record.availability().to_string(),
            condition: CONDITION.to_string(),
            brand,
            google_product_category: record.category.trim().to_string(),
            shipping,
        }
    }

    fn columns(&self) -> [&str; 11] {
        [
            &self.id,
            &self.title,
            &self.description,
            &self.link,
            &self.image_link,
            &self.price,
            &self.availability,
            &self.condition,
            &self.brand,
            &self.google_product_category,
            &self.shipping,
        ]
    }
}

fn format_money(amount: Decimal, currency: &str) -> String {
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{amount:.2} {currency}")
}

/// Projects every record, keeping catalog order.
#[must_use]
pub fn merchant_items(records: &[ProductRecord], currency: &str) -> Vec<MerchantItem> {
    records
        .iter()
        .map(|record| MerchantItem::from_record(record, currency))
        .collect()
}

/// Renders items as a tab-separated file with a header row.
///
/// # Errors
///
/// Returns [`FeedError::Csv`] if the writer fails.
pub fn to_tsv(items: &[MerchantItem]) -> Result<Vec<u8>, FeedError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());
    writer.write_record(MERCHANT_COLUMNS)?;
    for item in items {
        writer.write_record(item.columns())?;
    }
    writer
        .into_inner()
        .map_err(|e| FeedError::Csv(e.into_error().into()))
}

/// Renders items as an RSS 2.0 channel using Google's `g:` attributes.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the writer fails.
pub fn to_rss(items: &[MerchantItem], channel: &ChannelInfo) -> Result<Vec<u8>, FeedError> {
    let mut doc = XmlDoc::new()?;
    doc.open("rss", &[("version", "2.0"), ("xmlns:g", GOOGLE_NS)])?;
    doc.open("channel", &[])?;
    doc.text("title", &channel.title)?;
    doc.text("link", &channel.link)?;
    doc.text("description", &channel.description)?;

    for item in items {
        doc.open("item", &[])?;
        doc.text("g:id", &item.id)?;
        doc.text("title", &item.title)?;
        doc.text("description", &item.description)?;
        doc.text("link", &item.link)?;
        doc.text("g:image_link", &item.image_link)?;
        doc.text("g:price", &item.price)?;
        doc.text("g:availability", &item.availability)?;
        doc.text("g:condition", &item.condition)?;
        doc.text("g:brand", &item.brand)?;
        doc.text("g:google_product_category", &item.google_product_category)?;
        doc.open("g:shipping", &[])?;
        doc.text("g:price", &item.shipping)?;
        doc.close("g:shipping")?;
        doc.close("item")?;
    }

    doc.close("channel")?;
    doc.close("rss")?;
    tracing::debug!(items = items.len(), "merchant RSS feed rendered");
    Ok(doc.finish())
}

#[cfg(test)]
#[path = "merchant_test.rs"]
mod tests;
