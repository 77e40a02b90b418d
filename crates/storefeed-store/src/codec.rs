//! CSV encoding of the catalog file.

use std::collections::BTreeSet;
use std::path::Path;

use storefeed_core::{NormalizationRules, ProductRecord, CANONICAL_COLUMNS};

use crate::StoreError;

const BOM: char = '\u{feff}';

/// Parses catalog bytes into records.
///
/// Empty input yields no records. A missing `title` column, invalid UTF-8,
/// or a row wider than the header is reported as [`StoreError::Corrupt`].
/// Missing optional columns default.
pub(crate) fn decode(
    bytes: &[u8],
    path: &Path,
    rules: &NormalizationRules,
) -> Result<Vec<ProductRecord>, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StoreError::corrupt(path, e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect();

    if !headers.iter().any(|h| h == "title") {
        return Err(StoreError::corrupt(path, "missing `title` column"));
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| StoreError::corrupt(path, e.to_string()))?;
        if row.len() > headers.len() {
            return Err(StoreError::corrupt(
                path,
                format!(
                    "row {} has {} fields but the header has {}",
                    index + 2,
                    row.len(),
                    headers.len()
                ),
            ));
        }
        let columns = headers.iter().map(String::as_str).zip(row.iter());
        records.push(ProductRecord::from_columns(columns, rules));
    }

    Ok(records)
}

/// Canonical columns followed by every extra column seen across `records`,
/// in sorted order.
pub(crate) fn header_for(records: &[ProductRecord]) -> Vec<String> {
    let extras: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();

    CANONICAL_COLUMNS
        .iter()
        .copied()
        .chain(extras)
        .map(str::to_string)
        .collect()
}

pub(crate) fn encode(records: &[ProductRecord]) -> Result<Vec<u8>, StoreError> {
    let header = header_for(records);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|column| record.column_value(column)))?;
    }
    writer
        .into_inner()
        .map_err(|e| StoreError::Encode(e.into_error().into()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rust_decimal::Decimal;

    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("feed.csv")
    }

    #[test]
    fn decode_empty_bytes_is_empty_catalog() {
        let rules = NormalizationRules::default();
        assert!(decode(b"", &path(), &rules).unwrap().is_empty());
        assert!(decode(b"  \n", &path(), &rules).unwrap().is_empty());
    }

    #[test]
    fn decode_without_title_column_is_corrupt() {
        let rules = NormalizationRules::default();
        let err = decode(b"id,price\n1,2\n", &path(), &rules).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref reason, .. } if reason.contains("title")));
    }

    #[test]
    fn decode_wide_row_is_corrupt() {
        let rules = NormalizationRules::default();
        let err = decode(b"title,price\nLamp,2,extra\n", &path(), &rules).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn decode_short_row_defaults_missing_columns() {
        let rules = NormalizationRules::default();
        let records = decode(b"title,price,stock\nLamp\n", &path(), &rules).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Lamp");
        assert_eq!(records[0].price, Decimal::ZERO);
        assert_eq!(records[0].stock, 0);
    }

    #[test]
    fn decode_strips_bom_from_header() {
        let rules = NormalizationRules::default();
        let bytes = "\u{feff}title,price\nLamp,3\n".as_bytes();
        let records = decode(bytes, &path(), &rules).unwrap();
        assert_eq!(records[0].title, "Lamp");
    }

    #[test]
    fn header_is_canonical_then_sorted_extras() {
        let mut a = ProductRecord {
            title: "A".into(),
            ..Default::default()
        };
        a.extra.insert("title_fr".into(), "A-fr".into());
        let mut b = ProductRecord {
            title: "B".into(),
            ..Default::default()
        };
        b.extra.insert("color".into(), "red".into());

        let header = header_for(&[a, b]);
        assert_eq!(&header[..CANONICAL_COLUMNS.len()], CANONICAL_COLUMNS);
        assert_eq!(&header[CANONICAL_COLUMNS.len()..], ["color", "title_fr"]);
    }

    #[test]
    fn encode_quotes_embedded_commas() {
        let record = ProductRecord {
            title: "Shoe, red".into(),
            ..Default::default()
        };
        let bytes = encode(&[record]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Shoe, red\""));
    }
}
