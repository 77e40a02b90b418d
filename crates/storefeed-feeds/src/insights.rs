//! Merchandising insights over a catalog snapshot.

use std::fmt::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use storefeed_core::ProductRecord;

/// Stock strictly below this counts as low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Ratings at or above 4.5 count as top rated.
pub const TOP_RATED_MIN: Decimal = Decimal::from_parts(45, 0, 0, false, 1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightEntry {
    pub title: String,
    pub stock: i64,
    pub rating: Decimal,
}

impl From<&ProductRecord> for InsightEntry {
    fn from(record: &ProductRecord) -> Self {
        Self {
            title: record.title.clone(),
            stock: record.stock,
            rating: record.rating,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryInsights {
    pub low_stock: Vec<InsightEntry>,
    pub top_rated: Vec<InsightEntry>,
}

impl InventoryInsights {
    #[must_use]
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let low_stock = records
            .iter()
            .filter(|r| r.stock < LOW_STOCK_THRESHOLD)
            .map(InsightEntry::from)
            .collect();
        let top_rated = records
            .iter()
            .filter(|r| r.rating >= TOP_RATED_MIN)
            .map(InsightEntry::from)
            .collect();
        Self {
            low_stock,
            top_rated,
        }
    }

    /// Plain-text report for terminals.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::from("--- Inventory Insights ---\n\n");
        let _ = writeln!(
            out,
            "--- Low Stock Products (less than {LOW_STOCK_THRESHOLD} items) ---"
        );
        if self.low_stock.is_empty() {
            out.push_str("No low stock products found.\n");
        }
        for entry in &self.low_stock {
            let _ = writeln!(out, "- {} (Stock: {})", entry.title, entry.stock);
        }

        let _ = writeln!(
            out,
            "\n--- Top Rated Products (Rating {TOP_RATED_MIN}+) ---"
        );
        if self.top_rated.is_empty() {
            out.push_str("No top rated products found.\n");
        }
        for entry in &self.top_rated {
            let _ = writeln!(out, "- {} (Rating: {})", entry.title, entry.rating);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn record(title: &str, stock: i64, rating: &str) -> ProductRecord {
        ProductRecord {
            title: title.into(),
            stock,
            rating: Decimal::from_str(rating).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn partitions_by_thresholds() {
        let insights = InventoryInsights::from_records(&[
            record("Nearly Gone", 9, "3.0"),
            record("Plenty", 10, "4.5"),
            record("Sold Out", 0, "4.9"),
            record("Average", 40, "4.4"),
        ]);

        let low: Vec<&str> = insights.low_stock.iter().map(|e| e.title.as_str()).collect();
        let top: Vec<&str> = insights.top_rated.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(low, ["Nearly Gone", "Sold Out"]);
        assert_eq!(top, ["Plenty", "Sold Out"]);
    }

    #[test]
    fn text_report_mentions_empty_sections() {
        let text = InventoryInsights::default().render_text();
        assert!(text.contains("No low stock products found."));
        assert!(text.contains("No top rated products found."));
        assert!(text.contains("Rating 4.5+"));
    }

    #[test]
    fn text_report_lists_entries() {
        let text = InventoryInsights::from_records(&[record("Lamp", 2, "4.8")]).render_text();
        assert!(text.contains("- Lamp (Stock: 2)"));
        assert!(text.contains("- Lamp (Rating: 4.8)"));
    }
}
