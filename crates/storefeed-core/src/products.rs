use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::{
    self, derive_id, parse_price, parse_rating, parse_stock, scalar_text, NormalizationRules,
};
use crate::CoreError;

/// Column order used when the catalog is written to disk. Columns not in
/// this list are carried in [`ProductRecord::extra`] and written after it.
pub const CANONICAL_COLUMNS: [&str; 12] = [
    "id",
    "title",
    "image",
    "price",
    "url",
    "description",
    "brand",
    "rating",
    "stock",
    "category",
    "shipping",
    "vendor_id",
];

const MAX_TITLE_LEN: usize = 500;

/// One normalized catalog entry.
///
/// Every field is always populated; optional supplier values default to an
/// empty string or zero so readers never need to existence-check a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Supplier product id, or a value derived from the URL or title.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub url: String,
    /// Low end of the supplier's price range, never negative.
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub stock: i64,
    /// Free-form shipping annotation, e.g. `"2.50"` or `"Free"`.
    #[serde(default)]
    pub shipping: String,
    /// Set only on vendor-submitted records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    /// Non-canonical columns (e.g. localized titles), preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Stock-derived availability as rendered in merchant feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    InStock,
    OutOfStock,
}

impl Availability {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::InStock => "in stock",
            Availability::OutOfStock => "out of stock",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field used to match records for upsert and delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyField {
    #[default]
    Title,
    Id,
}

impl ProductRecord {
    #[must_use]
    pub fn availability(&self) -> Availability {
        if self.stock > 0 {
            Availability::InStock
        } else {
            Availability::OutOfStock
        }
    }

    #[must_use]
    pub fn is_vendor_owned(&self) -> bool {
        self.vendor_id.as_deref().is_some_and(|v| !v.is_empty())
    }

    #[must_use]
    pub fn key(&self, field: KeyField) -> &str {
        match field {
            KeyField::Title => &self.title,
            KeyField::Id => &self.id,
        }
    }

    /// Renders one column as it is written to the catalog file.
    #[must_use]
    pub fn column_value(&self, column: &str) -> String {
        match column {
            "id" => self.id.clone(),
            "title" => self.title.clone(),
            "image" => self.image.clone(),
            "price" => self.price.to_string(),
            "url" => self.url.clone(),
            "description" => self.description.clone(),
            "brand" => self.brand.clone(),
            "rating" => self.rating.to_string(),
            "stock" => self.stock.to_string(),
            "category" => self.category.clone(),
            "shipping" => self.shipping.clone(),
            "vendor_id" => self.vendor_id.clone().unwrap_or_default(),
            other => self.extra.get(other).cloned().unwrap_or_default(),
        }
    }

    /// Builds a record from `(column, value)` pairs read from a catalog row.
    ///
    /// Unknown columns land in `extra`; missing columns keep their defaults;
    /// malformed numbers degrade to zero.
    #[must_use]
    pub fn from_columns<'a, I>(columns: I, rules: &NormalizationRules) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = ProductRecord::default();
        for (column, value) in columns {
            match column {
                "id" => record.id = value.to_string(),
                "title" => record.title = value.to_string(),
                "image" => record.image = value.to_string(),
                "price" => record.price = parse_price(value),
                "url" => record.url = value.to_string(),
                "description" => record.description = rules.flatten(value),
                "brand" => record.brand = rules.flatten(value),
                "rating" => record.rating = parse_rating(value),
                "stock" => record.stock = parse_stock(value),
                "category" => record.category = rules.flatten(value),
                "shipping" => record.shipping = value.to_string(),
                "vendor_id" => {
                    record.vendor_id = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                }
                other => {
                    record.extra.insert(other.to_string(), value.to_string());
                }
            }
        }
        record
    }
}

/// Product payload accepted from admin and vendor write endpoints.
///
/// Numeric fields accept either JSON numbers or strings, matching what
/// spreadsheet-driven admin tooling tends to send.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub id: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub price: Value,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Value,
    #[serde(default)]
    pub stock: Value,
    #[serde(default)]
    pub shipping: Value,
    pub vendor_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProductInput {
    /// Validates the payload and converts it into a catalog record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the title is missing or too
    /// long, or when price, stock, or rating cannot be interpreted.
    pub fn into_record(self, rules: &NormalizationRules) -> Result<ProductRecord, CoreError> {
        let title = self.title.unwrap_or_default().trim().to_string();
        if title.is_empty() {
            return Err(CoreError::Validation("title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        let price = match scalar_text(&self.price) {
            None => Decimal::ZERO,
            Some(raw) => fields::try_parse_price(&raw)
                .map_err(|e| CoreError::Validation(format!("invalid price: {e}")))?,
        };

        let stock = match scalar_text(&self.stock) {
            None => 0,
            Some(raw) => fields::try_parse_stock(&raw)
                .map_err(|e| CoreError::Validation(format!("invalid stock: {e}")))?,
        };

        let rating = match scalar_text(&self.rating) {
            None => Decimal::ZERO,
            Some(raw) => fields::try_parse_rating(&raw)
                .map_err(|e| CoreError::Validation(format!("invalid rating: {e}")))?,
        };
        if rating > Decimal::from(5) {
            return Err(CoreError::Validation(
                "rating must be between 0 and 5".to_string(),
            ));
        }

        let url = self.url.unwrap_or_default().trim().to_string();
        let id = derive_id(self.id.as_deref().unwrap_or_default(), &url, &title);

        let extra = self
            .extra
            .into_iter()
            .filter(|(key, _)| !CANONICAL_COLUMNS.contains(&key.as_str()))
            .filter_map(|(key, value)| scalar_text(&value).map(|text| (key, text)))
            .collect();

        Ok(ProductRecord {
            id,
            title,
            image: self.image.unwrap_or_default().trim().to_string(),
            url,
            price,
            description: rules.flatten(self.description.as_deref().unwrap_or_default()),
            brand: rules.flatten(self.brand.as_deref().unwrap_or_default()),
            category: rules.flatten(self.category.as_deref().unwrap_or_default()),
            rating,
            stock,
            shipping: scalar_text(&self.shipping).unwrap_or_default(),
            vendor_id: self
                .vendor_id
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            extra,
        })
    }
}
