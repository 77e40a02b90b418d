//! Integration tests for `CatalogStore` against real files in a temp dir.

use std::str::FromStr;

use rust_decimal::Decimal;
use tempfile::TempDir;

use storefeed_core::{KeyField, NormalizationRules, ProductRecord};
use storefeed_store::{CatalogStore, SearchFilter, StoreError, UploadHistory, UpsertOutcome};

fn store_in(dir: &TempDir) -> CatalogStore {
    CatalogStore::new(dir.path().join("feed.csv"), NormalizationRules::default())
}

fn product(id: &str, title: &str, price: &str) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        title: title.to_string(),
        price: Decimal::from_str(price).unwrap(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn load_corrupt_file_fails() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), [0xff, 0xfe, b',', b'\n', 0xc3]).unwrap();

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "got: {err:?}");
}

#[tokio::test]
async fn load_tolerates_missing_optional_columns_and_flattens_lists() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        "title,description,stock\nWig,\"[\"\"Curly\"\", \"\"42\"\", \"\"cosplay\"\"]\",abc\n",
    )
    .unwrap();

    let records = store.load().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].description, "Curly");
    assert_eq!(records[0].stock, 0);
    assert_eq!(records[0].price, Decimal::ZERO);
    assert_eq!(records[0].brand, "");
}

// ---------------------------------------------------------------------------
// replace_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replace_all_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut first = product("1", "Red Shoe", "20");
    first.description = "Leather, size 42".into();
    first.stock = 7;
    first.rating = Decimal::from_str("4.5").unwrap();
    first.extra.insert("title_fr".into(), "Chaussure rouge".into());
    let second = product("2", "Blue Hat", "5.25");
    let records = vec![first, second];

    assert_eq!(store.replace_all(records.clone()).await.unwrap(), 2);
    let loaded = store.load().await.unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], records[0]);
    // Second record gains the extra column with an empty value.
    assert_eq!(loaded[1].title, "Blue Hat");
    assert_eq!(loaded[1].price, Decimal::from_str("5.25").unwrap());
    assert_eq!(
        loaded[1].extra.get("title_fr").map(String::as_str),
        Some("")
    );
}

#[tokio::test]
async fn replace_all_with_empty_input_preserves_catalog() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();
    let before = store.load().await.unwrap();

    assert_eq!(store.replace_all(Vec::new()).await.unwrap(), 0);
    assert_eq!(store.load().await.unwrap(), before);
}

#[tokio::test]
async fn replace_all_with_empty_input_does_not_create_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.replace_all(Vec::new()).await.unwrap();
    assert!(!store.path().exists());
}

#[tokio::test]
async fn replace_all_leaves_no_temp_file_behind() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["feed.csv"]);
}

// ---------------------------------------------------------------------------
// upsert / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upsert_same_record_twice_keeps_one_copy() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let record = product("1", "Lamp", "3");

    assert_eq!(
        store.upsert(record.clone(), KeyField::Title).await.unwrap(),
        UpsertOutcome::Inserted
    );
    assert_eq!(
        store.upsert(record, KeyField::Title).await.unwrap(),
        UpsertOutcome::Updated
    );

    let matching: Vec<_> = store
        .load()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.title == "Lamp")
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn upsert_by_title_replaces_first_match_in_place() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![
            product("1", "Lamp", "3"),
            product("2", "Mug", "4"),
            product("3", "Lamp", "5"),
        ])
        .await
        .unwrap();

    store
        .upsert(product("9", "Lamp", "30"), KeyField::Title)
        .await
        .unwrap();

    let loaded = store.load().await.unwrap();
    let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["9", "2", "3"]);
}

#[tokio::test]
async fn upsert_by_id_matches_on_id() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();

    store
        .upsert(product("1", "Desk Lamp", "4"), KeyField::Id)
        .await
        .unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Desk Lamp");
}

#[tokio::test]
async fn delete_by_key_removes_all_matches() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![
            product("1", "Lamp", "3"),
            product("2", "Mug", "4"),
            product("3", "Lamp", "5"),
        ])
        .await
        .unwrap();

    assert_eq!(
        store.delete_by_key("Lamp", KeyField::Title).await.unwrap(),
        2
    );
    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Mug");
}

#[tokio::test]
async fn delete_by_key_never_empties_the_catalog() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();
    let before = store.load().await.unwrap();

    assert_eq!(
        store.delete_by_key("Lamp", KeyField::Title).await.unwrap(),
        1
    );
    assert_eq!(store.load().await.unwrap(), before);
}

#[tokio::test]
async fn replace_vendor_records_never_empties_the_catalog() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .add_vendor_record("acme", product("a1", "Acme Mug", "4"))
        .await
        .unwrap();
    let before = store.load().await.unwrap();

    assert_eq!(
        store.replace_vendor_records("acme", Vec::new()).await.unwrap(),
        0
    );
    assert_eq!(store.load().await.unwrap(), before);
}

#[tokio::test]
async fn replace_vendor_records_with_empty_set_clears_only_that_vendor() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Supplier Lamp", "3")])
        .await
        .unwrap();
    store
        .add_vendor_record("acme", product("a1", "Acme Mug", "4"))
        .await
        .unwrap();

    assert_eq!(
        store.replace_vendor_records("acme", Vec::new()).await.unwrap(),
        0
    );
    let all = store.load().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Supplier Lamp");
}

#[tokio::test]
async fn delete_by_key_without_match_removes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();

    assert_eq!(
        store.delete_by_key("Sofa", KeyField::Title).await.unwrap(),
        0
    );
    assert_eq!(store.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_upserts_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .upsert(
                    product(&i.to_string(), &format!("Item {i}"), "1"),
                    KeyField::Title,
                )
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.load().await.unwrap().len(), 20);
}

// ---------------------------------------------------------------------------
// vendor partitions / supplier replace
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replace_vendor_records_leaves_other_rows_untouched() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Supplier Lamp", "3")])
        .await
        .unwrap();
    store
        .add_vendor_record("acme", product("a1", "Acme Mug", "4"))
        .await
        .unwrap();
    store
        .add_vendor_record("zen", product("z1", "Zen Mat", "9"))
        .await
        .unwrap();

    let written = store
        .replace_vendor_records(
            "acme",
            vec![
                product("a2", "Acme Cup", "2"),
                product("a3", "Acme Jug", "6"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(written, 2);

    let acme = store.vendor_records("acme").await.unwrap();
    let titles: Vec<&str> = acme.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Acme Cup", "Acme Jug"]);
    assert!(acme.iter().all(|r| r.vendor_id.as_deref() == Some("acme")));

    let all = store.load().await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].title, "Supplier Lamp");
    assert_eq!(store.vendor_records("zen").await.unwrap().len(), 1);
}

#[tokio::test]
async fn replace_supplier_records_keeps_vendor_rows() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Old Supplier Item", "3")])
        .await
        .unwrap();
    store
        .add_vendor_record("acme", product("a1", "Acme Mug", "4"))
        .await
        .unwrap();

    let written = store
        .replace_supplier_records(vec![product("2", "New Supplier Item", "8")])
        .await
        .unwrap();
    assert_eq!(written, 1);

    let titles: Vec<String> = store
        .load()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, ["New Supplier Item", "Acme Mug"]);
}

#[tokio::test]
async fn replace_supplier_records_with_empty_input_is_noop() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();

    assert_eq!(store.replace_supplier_records(Vec::new()).await.unwrap(), 0);
    assert_eq!(store.load().await.unwrap()[0].title, "Lamp");
}

// ---------------------------------------------------------------------------
// import / query
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_csv_replaces_catalog() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();

    let upload = b"title,price,stock\nRed Shoe,4.86 -- 6.22,15\nBlue Hat,5,0\n";
    assert_eq!(store.import_csv(upload).await.unwrap(), 2);

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded[0].title, "Red Shoe");
    assert_eq!(loaded[0].price, Decimal::from_str("4.86").unwrap());
    assert_eq!(loaded[1].availability().as_str(), "out of stock");
}

#[tokio::test]
async fn import_csv_rejects_upload_without_title_column() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .replace_all(vec![product("1", "Lamp", "3")])
        .await
        .unwrap();

    let err = store.import_csv(b"name,price\nX,1\n").await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert_eq!(store.load().await.unwrap()[0].title, "Lamp");
}

#[tokio::test]
async fn search_and_get_by_title_read_fresh_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let mut shoe = product("1", "Red Shoe", "20");
    shoe.category = "Shoes".into();
    let mut hat = product("2", "Blue Hat", "5");
    hat.category = "Hats".into();
    store.replace_all(vec![shoe, hat]).await.unwrap();

    let filter = SearchFilter {
        min_price: Some(Decimal::from(10)),
        ..Default::default()
    };
    let results = store.search(&filter).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Red Shoe");

    assert_eq!(store.get_by_title("Blue Hat").await.unwrap().id, "2");
    let err = store.get_by_title("Green Scarf").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn raw_bytes_of_missing_catalog_is_empty() {
    let dir = TempDir::new().unwrap();
    assert!(store_in(&dir).raw_bytes().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// upload history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_history_appends_entries() {
    let dir = TempDir::new().unwrap();
    let history = UploadHistory::new(dir.path().join("upload_history.json"));
    assert!(history.entries().await.unwrap().is_empty());

    history.record("feed-a.csv", "alice").await.unwrap();
    history.record("feed-b.csv", "bob").await.unwrap();

    let entries = history.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].filename, "feed-a.csv");
    assert_eq!(entries[1].username, "bob");
    assert!(entries[0].timestamp <= entries[1].timestamp);
}

#[tokio::test]
async fn upload_history_rejects_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("upload_history.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = UploadHistory::new(path).entries().await.unwrap_err();
    assert!(matches!(err, StoreError::History(_)));
}

#[tokio::test]
async fn upload_history_record_keeps_malformed_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("upload_history.json");
    std::fs::write(&path, "{not json").unwrap();

    let history = UploadHistory::new(&path);
    assert!(history.record("feed-a.csv", "alice").await.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
}

#[tokio::test]
async fn upload_history_leaves_no_temp_file_behind() {
    let dir = TempDir::new().unwrap();
    let history = UploadHistory::new(dir.path().join("upload_history.json"));
    history.record("feed-a.csv", "alice").await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["upload_history.json"]);
}
