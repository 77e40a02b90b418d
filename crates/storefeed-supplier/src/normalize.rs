//! Mapping from raw supplier product objects to [`ProductRecord`].
//!
//! The supplier is inconsistent about key names and value shapes (a
//! description may be a string, a list, or a string-encoded list), so each
//! field is looked up under several aliases and coerced leniently. Mapping
//! never fails: anything unusable becomes the field's default.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use storefeed_core::fields::{
    derive_id, flatten_values, parse_price, parse_rating, parse_stock, scalar_text,
};
use storefeed_core::{NormalizationRules, ProductRecord};

const ID_KEYS: &[&str] = &["pid", "id", "productId"];
const TITLE_KEYS: &[&str] = &["productNameEn", "title", "name"];
const IMAGE_KEYS: &[&str] = &["productImage", "image", "bigImage"];
const PRICE_KEYS: &[&str] = &["sellPrice", "price"];
const DESCRIPTION_KEYS: &[&str] = &["description", "productName"];
const BRAND_KEYS: &[&str] = &["brand", "brandName"];
const CATEGORY_KEYS: &[&str] = &["categoryName", "category"];
const STOCK_KEYS: &[&str] = &["totalStock", "stock", "inventory"];
const RATING_KEYS: &[&str] = &["rating"];
const SHIPPING_KEYS: &[&str] = &["shippingFee", "shipping"];
const URL_KEYS: &[&str] = &["url", "productUrl"];

/// Pure supplier-to-catalog field mapper.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    rules: NormalizationRules,
    product_url_base: String,
}

impl FieldMapper {
    /// `product_url_base` is prefixed to the supplier id when a product
    /// carries no URL of its own, e.g. `https://app.example.com/product-detail/`.
    #[must_use]
    pub fn new(rules: NormalizationRules, product_url_base: impl Into<String>) -> Self {
        Self {
            rules,
            product_url_base: product_url_base.into(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &NormalizationRules {
        &self.rules
    }

    /// Maps one raw supplier object. Every output field is populated.
    #[must_use]
    pub fn map(&self, raw: &Map<String, Value>) -> ProductRecord {
        let title = text(raw, TITLE_KEYS);
        let description = self.list_text(raw, DESCRIPTION_KEYS);
        let supplier_category = self.list_text(raw, CATEGORY_KEYS);
        let category = self
            .rules
            .category
            .apply(&title, &description, &supplier_category);

        let explicit_id = text(raw, ID_KEYS);
        let mut url = text(raw, URL_KEYS);
        if url.is_empty() && !explicit_id.is_empty() {
            url = format!("{}{explicit_id}", self.product_url_base);
        }
        let id = derive_id(&explicit_id, &url, &title);

        ProductRecord {
            id,
            image: text(raw, IMAGE_KEYS),
            url,
            price: parse_price(&text(raw, PRICE_KEYS)),
            description,
            brand: self.list_text(raw, BRAND_KEYS),
            category,
            rating: parse_rating(&text(raw, RATING_KEYS)),
            stock: parse_stock(&text(raw, STOCK_KEYS)),
            shipping: text(raw, SHIPPING_KEYS),
            vendor_id: None,
            extra: BTreeMap::new(),
            title,
        }
    }

    /// Like [`text`], but arrays and string-encoded lists are flattened.
    fn list_text(&self, raw: &Map<String, Value>, keys: &[&str]) -> String {
        match first_present(raw, keys) {
            Some(Value::Array(items)) => flatten_values(items, &self.rules.denylist),
            Some(other) => scalar_text(other)
                .map(|s| self.rules.flatten(s.trim()))
                .unwrap_or_default(),
            None => String::new(),
        }
    }
}

/// First present, non-null alias rendered as trimmed text.
fn text(raw: &Map<String, Value>, keys: &[&str]) -> String {
    first_present(raw, keys)
        .and_then(scalar_text)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn first_present<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}
