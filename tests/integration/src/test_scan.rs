//! Parallel segmented scans against the in-memory store.

use std::collections::HashSet;

use dynoscan_core::{ScanConfig, plan_segments, read_scan_segment};
use dynoscan_model::AttributeValue;

use crate::{MemoryStore, init_tracing, order_table};

#[tokio::test]
async fn test_should_read_all_segments_concurrently() {
    init_tracing();
    let store = MemoryStore::new(order_table(200));

    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .total_segments(4)
        .page_size(16)
        .build();
    let specs = plan_segments(&config).unwrap();

    let reads = specs
        .into_iter()
        .map(|spec| read_scan_segment(&store, spec));
    let per_segment = futures::future::try_join_all(reads).await.unwrap();

    // Segments are disjoint and together cover the whole table.
    let mut seen = HashSet::new();
    for items in &per_segment {
        for item in items {
            let pk = item.get("pk").and_then(AttributeValue::as_s).unwrap();
            assert!(seen.insert(pk.to_owned()), "item {pk} read twice");
        }
    }
    assert_eq!(seen.len(), 200);
}

#[tokio::test]
async fn test_should_paginate_single_segment() {
    init_tracing();
    let store = MemoryStore::new(order_table(55));

    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .page_size(10)
        .build();
    let specs = plan_segments(&config).unwrap();
    assert_eq!(specs.len(), 1);

    let items = read_scan_segment(&store, specs.into_iter().next().unwrap())
        .await
        .unwrap();
    assert_eq!(items.len(), 55);
    // 55 items at 10 per page: five full pages with a token, one final.
    assert_eq!(store.pages_served(), 6);
}

#[tokio::test]
async fn test_should_apply_projection_through_placeholders() {
    init_tracing();
    let store = MemoryStore::new(order_table(30));

    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .required_columns(Some(vec!["status".to_owned(), "total".to_owned()]))
        .build();
    let specs = plan_segments(&config).unwrap();

    let items = read_scan_segment(&store, specs.into_iter().next().unwrap())
        .await
        .unwrap();
    assert_eq!(items.len(), 30);
    for item in &items {
        assert!(item.contains_key("status"));
        assert!(item.contains_key("total"));
        assert!(!item.contains_key("pk"));
    }
}

#[tokio::test]
async fn test_should_apply_filter_through_placeholders() {
    init_tracing();
    // 90 orders, every third shipped.
    let store = MemoryStore::new(order_table(90));

    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .total_segments(2)
        .page_size(8)
        .filter_expression(Some("status = 'shipped'".to_owned()))
        .build();
    let specs = plan_segments(&config).unwrap();

    let reads = specs
        .into_iter()
        .map(|spec| read_scan_segment(&store, spec));
    let per_segment = futures::future::try_join_all(reads).await.unwrap();

    let total: usize = per_segment.iter().map(Vec::len).sum();
    assert_eq!(total, 30);
    for items in &per_segment {
        for item in items {
            assert_eq!(
                item.get("status"),
                Some(&AttributeValue::S("shipped".to_owned()))
            );
        }
    }
}

#[tokio::test]
async fn test_should_combine_matching_projection_and_filter() {
    init_tracing();
    let store = MemoryStore::new(order_table(30));

    // Projecting the filtered attribute first keeps both allocators
    // agreeing on `#0 = status`.
    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .required_columns(Some(vec!["status".to_owned()]))
        .filter_expression(Some("status = 'open'".to_owned()))
        .build();
    let specs = plan_segments(&config).unwrap();

    let items = read_scan_segment(&store, specs.into_iter().next().unwrap())
        .await
        .unwrap();
    assert_eq!(items.len(), 20);
    for item in &items {
        assert_eq!(item.len(), 1);
        assert_eq!(
            item.get("status"),
            Some(&AttributeValue::S("open".to_owned()))
        );
    }
}
