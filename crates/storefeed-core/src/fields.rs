//! Field-level normalization shared by the supplier mapper, the catalog
//! reader, and admin input validation.
//!
//! Every parser comes in two flavours: a `try_*` function returning a typed
//! [`FieldError`], and a plain function that degrades to the documented
//! default. Catalog ingestion uses the defaulting form so a malformed field
//! never drops a product; admin input uses the `try_*` form so bad input is
//! rejected before it reaches the store.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

/// Separator used by the supplier for price ranges, e.g. `"4.86 -- 6.22"`.
pub const PRICE_RANGE_SEPARATOR: &str = "--";

/// Why a raw field value could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("value is empty")]
    Empty,

    #[error("value {0:?} is not a number")]
    Malformed(String),

    #[error("value {0:?} is negative")]
    Negative(String),
}

/// Parses a supplier price, taking the low end of a `"low -- high"` range.
///
/// # Errors
///
/// Returns [`FieldError`] when the value is empty, not a decimal, or negative.
pub fn try_parse_price(raw: &str) -> Result<Decimal, FieldError> {
    let low = raw
        .split(PRICE_RANGE_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim();
    if low.is_empty() {
        return Err(FieldError::Empty);
    }
    let value = Decimal::from_str(low).map_err(|_| FieldError::Malformed(raw.to_owned()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FieldError::Negative(raw.to_owned()));
    }
    Ok(value.normalize())
}

/// Parses a price, falling back to `0` on any failure.
#[must_use]
pub fn parse_price(raw: &str) -> Decimal {
    try_parse_price(raw).unwrap_or(Decimal::ZERO)
}

/// Parses an integer stock level.
///
/// # Errors
///
/// Returns [`FieldError::Empty`] or [`FieldError::Malformed`].
pub fn try_parse_stock(raw: &str) -> Result<i64, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| FieldError::Malformed(raw.to_owned()))
}

/// Parses a stock level, falling back to `0` (out of stock).
#[must_use]
pub fn parse_stock(raw: &str) -> i64 {
    try_parse_stock(raw).unwrap_or(0)
}

/// Parses a merchandising rating.
///
/// # Errors
///
/// Returns [`FieldError`] when the value is empty, not a decimal, or negative.
pub fn try_parse_rating(raw: &str) -> Result<Decimal, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }
    let value = Decimal::from_str(trimmed).map_err(|_| FieldError::Malformed(raw.to_owned()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FieldError::Negative(raw.to_owned()));
    }
    Ok(value.normalize())
}

/// Parses a rating, falling back to `0`.
#[must_use]
pub fn parse_rating(raw: &str) -> Decimal {
    try_parse_rating(raw).unwrap_or(Decimal::ZERO)
}

/// Renders a scalar JSON value as plain text.
///
/// Strings pass through, numbers and booleans use their JSON rendering,
/// `null` yields `None`. Arrays and objects are rendered as compact JSON so
/// the list-flattening rule can still recognise them downstream.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Flattens a string-encoded list (`"[\"a\", \"b\"]"`) into `"a, b"`.
///
/// Values that do not look like a bracketed list, or that fail to parse as
/// a JSON array, are returned unchanged.
#[must_use]
pub fn flatten_list_field(raw: &str, denylist: &[String]) -> String {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return raw.to_owned();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => flatten_values(&items, denylist),
        _ => raw.to_owned(),
    }
}

/// Joins the string elements of a list with `", "`, skipping blanks,
/// purely numeric tokens, and denylisted tokens (case-insensitive).
#[must_use]
pub fn flatten_values(items: &[Value], denylist: &[String]) -> String {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| !item.chars().all(|c| c.is_ascii_digit()))
        .filter(|item| !denylist.iter().any(|d| d.eq_ignore_ascii_case(item)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Derives a record identifier when the supplier omits one: the last
/// non-empty URL path segment, else the title.
#[must_use]
pub fn derive_id(id: &str, url: &str, title: &str) -> String {
    let id = id.trim();
    if !id.is_empty() {
        return id.to_owned();
    }
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    if !segment.is_empty() && !segment.contains(':') && path.contains('/') {
        return segment.to_owned();
    }
    title.trim().to_owned()
}

/// Keyword rule that forces a fixed category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    keywords: Vec<String>,
    label: String,
}

impl CategoryRule {
    /// Builds a rule; keywords are lowercased and blanks dropped.
    #[must_use]
    pub fn new<I, S>(keywords: I, label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            label: label.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns the forced label when any keyword occurs in the title,
    /// description, or supplier category; otherwise the supplier category.
    #[must_use]
    pub fn apply(&self, title: &str, description: &str, supplier_category: &str) -> String {
        let haystacks = [
            title.to_lowercase(),
            description.to_lowercase(),
            supplier_category.to_lowercase(),
        ];
        let matched = self
            .keywords
            .iter()
            .any(|kw| haystacks.iter().any(|h| h.contains(kw.as_str())));
        if matched {
            self.label.clone()
        } else {
            supplier_category.to_owned()
        }
    }
}

impl Default for CategoryRule {
    fn default() -> Self {
        Self::new(
            ["health", "beauty", "skincare"],
            "Health, Beauty and Skincare Products",
        )
    }
}

/// Normalization knobs applied to every ingested product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationRules {
    pub category: CategoryRule,
    /// Tokens dropped from flattened list fields, compared case-insensitively.
    pub denylist: Vec<String>,
}

impl Default for NormalizationRules {
    fn default() -> Self {
        Self {
            category: CategoryRule::default(),
            denylist: vec!["cosplay".to_owned()],
        }
    }
}

impl NormalizationRules {
    #[must_use]
    pub fn flatten(&self, raw: &str) -> String {
        flatten_list_field(raw, &self.denylist)
    }
}

#[cfg(test)]
#[path = "fields_test.rs"]
mod tests;
