//! `sitemap.xml` generation.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use storefeed_core::ProductRecord;

use crate::xml::XmlDoc;
use crate::FeedError;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Site pages listed ahead of the product pages.
pub const STATIC_PAGES: [&str; 6] = [
    "/",
    "/about.html",
    "/contact.html",
    "/privacy.html",
    "/terms.html",
    "/blog.html",
];

/// Static pages followed by one product page per titled record.
#[must_use]
pub fn sitemap_urls(site_url: &str, records: &[ProductRecord]) -> Vec<String> {
    let site = site_url.trim_end_matches('/');
    let pages = STATIC_PAGES.iter().map(|page| format!("{site}{page}"));
    let products = records
        .iter()
        .map(|record| record.title.trim())
        .filter(|title| !title.is_empty())
        .map(|title| {
            format!(
                "{site}/product?title={}",
                utf8_percent_encode(title, NON_ALPHANUMERIC)
            )
        });
    pages.chain(products).collect()
}

/// Renders a `urlset` document.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the writer fails.
pub fn to_sitemap_xml(urls: &[String]) -> Result<Vec<u8>, FeedError> {
    let mut doc = XmlDoc::new()?;
    doc.open("urlset", &[("xmlns", SITEMAP_NS)])?;
    for url in urls {
        doc.open("url", &[])?;
        doc.text("loc", url)?;
        doc.close("url")?;
    }
    doc.close("urlset")?;
    Ok(doc.finish())
}
