//! Read-only filtering over a catalog snapshot.

use rust_decimal::Decimal;
use storefeed_core::ProductRecord;

/// Conjunctive product filter. Unset (or blank) criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Case-insensitive substring of title, description, brand, or category.
    pub text: Option<String>,
    /// Case-insensitive substring of category.
    pub category: Option<String>,
    /// Inclusive lower price bound, default `0`.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound, default unbounded.
    pub max_price: Option<Decimal>,
}

impl SearchFilter {
    #[must_use]
    pub fn matches(&self, record: &ProductRecord) -> bool {
        let min = self.min_price.unwrap_or(Decimal::ZERO);
        if record.price < min {
            return false;
        }
        if self.max_price.is_some_and(|max| record.price > max) {
            return false;
        }

        if let Some(category) = non_blank(self.category.as_deref()) {
            if !contains_ci(&record.category, &category) {
                return false;
            }
        }

        if let Some(text) = non_blank(self.text.as_deref()) {
            let hit = [
                &record.title,
                &record.description,
                &record.brand,
                &record.category,
            ]
            .iter()
            .any(|field| contains_ci(field, &text));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Keeps matching records in catalog order.
#[must_use]
pub fn search(records: Vec<ProductRecord>, filter: &SearchFilter) -> Vec<ProductRecord> {
    records
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect()
}

/// First record with exactly this title.
#[must_use]
pub fn find_by_title(records: Vec<ProductRecord>, title: &str) -> Option<ProductRecord> {
    records.into_iter().find(|record| record.title == title)
}

/// Lowercased needle, or `None` when absent or whitespace.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(title: &str, price: &str, category: &str) -> ProductRecord {
        ProductRecord {
            title: title.to_string(),
            price: Decimal::from_str(price).unwrap(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    fn catalog() -> Vec<ProductRecord> {
        vec![
            product("Red Shoe", "20", "Shoes"),
            product("Blue Hat", "5", "Hats"),
        ]
    }

    fn titles(records: &[ProductRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn min_price_excludes_cheaper_products() {
        let filter = SearchFilter {
            min_price: Some(Decimal::from(10)),
            ..Default::default()
        };
        assert_eq!(titles(&search(catalog(), &filter)), ["Red Shoe"]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filter = SearchFilter {
            min_price: Some(Decimal::from(5)),
            max_price: Some(Decimal::from(20)),
            ..Default::default()
        };
        assert_eq!(
            titles(&search(catalog(), &filter)),
            ["Red Shoe", "Blue Hat"]
        );
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let results = search(catalog(), &SearchFilter::default());
        assert_eq!(titles(&results), ["Red Shoe", "Blue Hat"]);
    }

    #[test]
    fn zero_priced_products_pass_default_bounds() {
        let records = vec![product("Mystery Box", "0", "")];
        assert_eq!(search(records, &SearchFilter::default()).len(), 1);
    }

    #[test]
    fn text_matches_any_searchable_field_case_insensitively() {
        let mut records = catalog();
        records[1].brand = "Acme Headwear".into();
        let filter = SearchFilter {
            text: Some("HEADWEAR".into()),
            ..Default::default()
        };
        assert_eq!(titles(&search(records, &filter)), ["Blue Hat"]);
    }

    #[test]
    fn category_is_substring_match() {
        let filter = SearchFilter {
            category: Some("sho".into()),
            ..Default::default()
        };
        assert_eq!(titles(&search(catalog(), &filter)), ["Red Shoe"]);
    }

    #[test]
    fn blank_criteria_are_ignored() {
        let filter = SearchFilter {
            text: Some("   ".into()),
            category: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(search(catalog(), &filter).len(), 2);
    }

    #[test]
    fn unmatched_filter_yields_empty_result() {
        let filter = SearchFilter {
            text: Some("umbrella".into()),
            ..Default::default()
        };
        assert!(search(catalog(), &filter).is_empty());
    }

    #[test]
    fn find_by_title_returns_first_exact_match() {
        let mut records = catalog();
        let mut dup = product("Blue Hat", "9", "Caps");
        dup.id = "second".into();
        records.push(dup);

        let found = find_by_title(records, "Blue Hat").unwrap();
        assert_eq!(found.category, "Hats");
        assert!(find_by_title(catalog(), "blue hat").is_none());
    }
}
