use std::str::FromStr;

use rust_decimal::Decimal;
use storefeed_core::ProductRecord;

use super::*;

fn record() -> ProductRecord {
    ProductRecord {
        id: "1424608189734850560".into(),
        title: "Vitamin C Serum".into(),
        image: "https://img.example.com/a.jpg".into(),
        url: "https://app.example.com/product-detail/1424608189734850560".into(),
        price: Decimal::from_str("4.86").unwrap(),
        description: "Brightening serum".into(),
        brand: "Glow".into(),
        category: "Health, Beauty and Skincare Products".into(),
        stock: 15,
        shipping: "1.50 NGN".into(),
        ..Default::default()
    }
}

fn channel() -> ChannelInfo {
    ChannelInfo {
        title: "Example Store".into(),
        link: "https://example.com".into(),
        description: "Product feed".into(),
    }
}

#[test]
fn maps_record_fields() {
    let item = MerchantItem::from_record(&record(), "NGN");
    assert_eq!(item.id, "1424608189734850560");
    assert_eq!(
        item.link,
        "https://app.example.com/product-detail/1424608189734850560"
    );
    assert_eq!(item.image_link, "https://img.example.com/a.jpg");
    assert_eq!(item.price, "4.86 NGN");
    assert_eq!(item.availability, "in stock");
    assert_eq!(item.condition, "new");
    assert_eq!(item.brand, "Glow");
    assert_eq!(
        item.google_product_category,
        "Health, Beauty and Skincare Products"
    );
    assert_eq!(item.shipping, "1.50 NGN");
}

#[test]
fn missing_values_get_feed_defaults() {
    let bare = ProductRecord {
        title: "Phone Case".into(),
        url: "https://app.example.com/product-detail/778899".into(),
        ..Default::default()
    };
    let item = MerchantItem::from_record(&bare, "NGN");
    assert_eq!(item.id, "778899", "id recovered from product-detail link");
    assert_eq!(item.price, "0.00 NGN");
    assert_eq!(item.availability, "out of stock");
    assert_eq!(item.brand, "Generic");
    assert_eq!(item.shipping, "0.00 NGN");
}

#[test]
fn id_stays_empty_when_link_has_no_product_id() {
    let bare = ProductRecord {
        title: "Mug".into(),
        url: "https://shop.example.com/mug".into(),
        ..Default::default()
    };
    assert_eq!(MerchantItem::from_record(&bare, "USD").id, "");
}

#[test]
fn price_is_rounded_to_cents() {
    let mut r = record();
    r.price = Decimal::from_str("12.345").unwrap();
    assert_eq!(MerchantItem::from_record(&r, "USD").price, "12.35 USD");
    r.price = Decimal::from(7);
    assert_eq!(MerchantItem::from_record(&r, "USD").price, "7.00 USD");
}

#[test]
fn tsv_has_header_and_rows_in_order() {
    let mut second = record();
    second.title = "Second".into();
    let items = merchant_items(&[record(), second], "NGN");
    let tsv = String::from_utf8(to_tsv(&items).unwrap()).unwrap();
    let lines: Vec<&str> = tsv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], MERCHANT_COLUMNS.join("\t"));
    assert!(lines[1].starts_with("1424608189734850560\tVitamin C Serum\t"));
    assert!(lines[2].contains("\tSecond\t"));
}

#[test]
fn empty_catalog_still_writes_header() {
    let tsv = String::from_utf8(to_tsv(&[]).unwrap()).unwrap();
    assert_eq!(tsv.trim_end(), MERCHANT_COLUMNS.join("\t"));
}

#[test]
fn rss_uses_google_namespace_and_escapes_text() {
    let mut r = record();
    r.title = "Salt & Pepper <Set>".into();
    let xml = String::from_utf8(to_rss(&merchant_items(&[r], "NGN"), &channel()).unwrap()).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(r#"<rss version="2.0" xmlns:g="http://base.google.com/ns/1.0">"#));
    assert!(xml.contains("<g:id>1424608189734850560</g:id>"));
    assert!(xml.contains("<title>Salt &amp; Pepper &lt;Set&gt;</title>"));
    assert!(xml.contains("<g:price>4.86 NGN</g:price>"));
    assert!(xml.contains("<g:availability>in stock</g:availability>"));
    assert_eq!(xml.matches("<item>").count(), 1);
}

#[test]
fn site_channel_links_back_to_storefront() {
    let channel = ChannelInfo::for_site("https://shop.example.com");
    assert_eq!(channel.link, "https://shop.example.com");

    let xml = String::from_utf8(to_rss(&[], &channel).unwrap()).unwrap();
    assert!(xml.contains("<link>https://shop.example.com</link>"));
    assert!(xml.contains("<title>Product catalog</title>"));
}
